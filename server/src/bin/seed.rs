//! Operator seeding tool: provisions a charger with a hashed secret and,
//! optionally, its site and an active tariff.

use {
    clap::Parser,
    cpms_server::Config,
    cpms_shared::secrets,
    cpms_storage::{
        ChargerRepository, NewCharger, PgChargerRepository, PgSiteRepository, PgTariffRepository,
        SiteRepository, TariffRepository,
    },
    rust_decimal::Decimal,
};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed a charger, site and tariff")]
struct Args {
    /// Charge point id.
    #[arg(long, default_value = "CP-123")]
    id: String,
    /// Shared secret; only its SHA-256 digest is stored.
    #[arg(long, default_value = "devsecret")]
    secret: String,
    /// Mark the charger active.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    active: bool,
    #[arg(long, default_value = "ABB")]
    vendor: String,
    #[arg(long, default_value = "Terra54")]
    model: String,
    #[arg(long, default_value = "1.6J")]
    ocpp: String,
    /// Site name; created (or reused) and linked when given.
    #[arg(long)]
    site: Option<String>,
    /// Installs an active per-kWh tariff on the site.
    #[arg(long)]
    price_per_kwh: Option<Decimal>,
    #[arg(long, default_value = "USD")]
    currency: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::load()?;

    let pool = cpms_storage::connect(&config.database_url).await?;
    cpms_storage::MIGRATOR.run(&pool).await?;

    let chargers = PgChargerRepository::new(pool.clone());
    let sites = PgSiteRepository::new(pool.clone());
    let tariffs = PgTariffRepository::new(pool.clone());

    chargers
        .upsert(NewCharger {
            charge_point_id: args.id.clone(),
            secret_hash: secrets::hash_secret(&args.secret),
            is_active: args.active,
            vendor: args.vendor,
            model: args.model,
            ocpp_version: args.ocpp,
        })
        .await?;

    if let Some(site_name) = args.site {
        let site_id = sites.create(&site_name).await?;
        chargers.set_site(&args.id, site_id).await?;
        if let Some(price_per_kwh) = args.price_per_kwh {
            tariffs
                .upsert_active_for_site(site_id, price_per_kwh, &args.currency)
                .await?;
        }
        println!("seeded site {site_name} ({site_id})");
    }

    println!("seeded charger {} (active={})", args.id, args.active);
    pool.close().await;
    Ok(())
}
