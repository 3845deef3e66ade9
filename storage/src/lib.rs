//! Persistence layer for the charge-point management system.
//!
//! Each entity lives in its own module with:
//!
//! * The domain model and the repository trait.
//! * A Postgres implementation (`pg`), the system of record.
//! * An in-memory implementation (`in_memory`) used by tests and local
//!   experiments.

pub mod charger;
pub mod command;
pub mod connector;
pub mod event;
pub mod pool;
pub mod session;
pub mod settlement;
pub mod site;
pub mod tariff;

pub use {
    charger::{Charger, ChargerRepository, InMemoryChargerRepository, NewCharger, PgChargerRepository},
    sqlx::PgPool,
    command::{
        Command, CommandRepository, CommandStatus, InMemoryCommandRepository, NewCommand,
        PgCommandRepository,
    },
    connector::{ConnectorState, ConnectorStateRepository, InMemoryConnectorStateRepository, PgConnectorStateRepository},
    event::{EventRepository, InMemoryEventRepository, PgEventRepository},
    pool::{MIGRATOR, connect},
    session::{
        EnergySource, Finalization, InMemorySessionRepository, NewMeterSample, NewSession,
        PgSessionRepository, Session, SessionRepository,
    },
    settlement::{
        InMemorySettlementRepository, PgSettlementRepository, Settlement, SettlementRepository,
        SettlementStatus,
    },
    site::{InMemorySiteRepository, PgSiteRepository, Site, SiteRepository},
    tariff::{InMemoryTariffRepository, PgTariffRepository, Tariff, TariffRepository},
};
