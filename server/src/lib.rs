//! Process wiring: configuration, pool, application construction, listener
//! lifecycle.

pub use config::Config;

use {
    cpms_app::{Application, Dependencies},
    cpms_gateway::HttpGatewayClient,
    cpms_shared::Result,
    cpms_storage::{
        PgChargerRepository, PgCommandRepository, PgConnectorStateRepository, PgEventRepository,
        PgPool, PgSessionRepository, PgSettlementRepository, PgSiteRepository, PgTariffRepository,
    },
    std::{sync::Arc, time::Duration},
    tokio::sync::oneshot,
};

mod config;

/// In-flight requests get this long to finish once shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The production dependency selection: Postgres rows, HTTP gateway.
pub struct PgDependencies;

impl Dependencies for PgDependencies {
    type Chargers = PgChargerRepository;
    type Connectors = PgConnectorStateRepository;
    type Events = PgEventRepository;
    type Sessions = PgSessionRepository;
    type Sites = PgSiteRepository;
    type Tariffs = PgTariffRepository;
    type Settlements = PgSettlementRepository;
    type Commands = PgCommandRepository;
    type Gateway = HttpGatewayClient;
}

pub fn build_application(pool: PgPool, config: &Config) -> Result<Application<PgDependencies>> {
    Ok(Application {
        chargers: PgChargerRepository::new(pool.clone()),
        connectors: PgConnectorStateRepository::new(pool.clone()),
        events: PgEventRepository::new(pool.clone()),
        sessions: PgSessionRepository::new(pool.clone()),
        sites: PgSiteRepository::new(pool.clone()),
        tariffs: PgTariffRepository::new(pool.clone()),
        settlements: PgSettlementRepository::new(pool.clone()),
        commands: PgCommandRepository::new(pool),
        gateway: HttpGatewayClient::new(
            config.gateway_base_url.clone(),
            config.gateway_api_key.clone(),
        )?,
        max_event_skew: config.max_event_skew,
    })
}

/// Runs the server until SIGINT/SIGTERM, then drains and closes the pool.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let pool = cpms_storage::connect(&config.database_url).await?;
    cpms_storage::MIGRATOR.run(&pool).await?;

    let app = Arc::new(build_application(pool.clone(), &config)?);
    let api = cpms_api::routes(app, config.ingress_api_key.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr, serving) = warp::serve(api).try_bind_with_graceful_shutdown(
        config.listen_addr,
        async move {
            shutdown_rx.await.ok();
        },
    )?;
    tracing::info!(%addr, "cpms listening");
    let server = tokio::spawn(serving);

    wait_for_shutdown().await;
    tracing::info!("shutdown signal received, draining in-flight requests");
    let _ = shutdown_tx.send(());
    if tokio::time::timeout(DRAIN_TIMEOUT, server).await.is_err() {
        tracing::warn!("drain window elapsed with requests still in flight");
    }

    pool.close().await;
    tracing::info!("cpms shutdown complete");
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                // Interrupt alone still stops the process.
                tracing::error!(%error, "SIGTERM stream unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        () = sigterm => {}
    }
}
