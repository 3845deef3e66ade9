//! The application layer for orchestrating the ingest-to-settlement
//! pipeline.
//!
//! [`Application`] owns one repository per entity plus the outbound gateway
//! client, all selected through the [`Dependencies`] trait so the server can
//! wire Postgres while tests wire the in-memory doubles. Each concern lives
//! in its own impl file: event dispatch, energy finalization, pricing,
//! settlement and command fan-out.

pub use {
    auth::ChargerAuth,
    command::{CommandOutcome, CommandRequest},
};

use {
    cpms_gateway::GatewayApi,
    cpms_storage::{
        ChargerRepository, CommandRepository, ConnectorStateRepository, EventRepository,
        SessionRepository, SettlementRepository, SiteRepository, TariffRepository,
    },
    std::time::Duration,
};

mod auth;
mod command;
mod envelope;
mod finalize;
mod pricing;
mod processor;
mod query;
mod settlement;

/// Bundles the concrete collaborator types behind one parameter.
pub trait Dependencies: Send + Sync + 'static {
    type Chargers: ChargerRepository;
    type Connectors: ConnectorStateRepository;
    type Events: EventRepository;
    type Sessions: SessionRepository;
    type Sites: SiteRepository;
    type Tariffs: TariffRepository;
    type Settlements: SettlementRepository;
    type Commands: CommandRepository;
    type Gateway: GatewayApi;
}

pub struct Application<D: Dependencies> {
    pub chargers: D::Chargers,
    pub connectors: D::Connectors,
    pub events: D::Events,
    pub sessions: D::Sessions,
    pub sites: D::Sites,
    pub tariffs: D::Tariffs,
    pub settlements: D::Settlements,
    pub commands: D::Commands,
    pub gateway: D::Gateway,
    /// Events timestamped outside `[now - skew, now + skew]` are clamped to
    /// `now`; zero disables the correction.
    pub max_event_skew: Duration,
}
