//! Charging sessions and their meter-sample log.
//!
//! A session is created by `TransactionStarted`, closed by
//! `TransactionEnded` and finalized exactly once with a
//! [`Finalization`] describing where its energy figure came from.
//! Meter samples are append-only; the full raw envelope of each
//! `MeterSample` event is retained so energy extraction can be re-run.

mod in_memory;
mod pg;

pub use {in_memory::InMemorySessionRepository, pg::PgSessionRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    rust_decimal::Decimal,
    uuid::Uuid,
};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub session_id: Uuid,
    pub charge_point_id: String,
    pub connector_id: i32,
    pub transaction_id: i32,
    pub id_tag: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub meter_start_wh: Option<i64>,
    pub meter_stop_wh: Option<i64>,
    pub reason: Option<String>,
    pub energy_wh: Option<i64>,
    pub energy_source: Option<String>,
    pub is_estimated: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub tariff_id: Option<Uuid>,
    pub cost_amount: Option<Decimal>,
    pub cost_currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub charge_point_id: String,
    pub connector_id: i32,
    pub transaction_id: i32,
    pub id_tag: String,
    pub started_at: DateTime<Utc>,
    pub meter_start_wh: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewMeterSample {
    pub session_id: Uuid,
    pub charge_point_id: String,
    pub transaction_id: i32,
    pub ts: DateTime<Utc>,
    pub samples_json: serde_json::Value,
}

/// Where a finalized session's energy figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergySource {
    StopTransaction,
    Register,
    Interval,
    Missing,
}

impl EnergySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StopTransaction => "StopTransaction",
            Self::Register => "MeterValues.Register",
            Self::Interval => "MeterValues.Interval",
            Self::Missing => "Missing",
        }
    }
}

/// The outcome of the energy fallback chain, applied in one write.
#[derive(Debug, Clone)]
pub struct Finalization {
    pub energy_wh: Option<i64>,
    pub source: EnergySource,
    pub is_estimated: bool,
    /// Fills `meter_stop_wh` when the register fallback recovered it and the
    /// column is still NULL.
    pub backfill_meter_stop_wh: Option<i64>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    async fn start(&self, session: NewSession) -> Result<Uuid>;

    /// Canonical session picker for a charger-scoped transaction id:
    /// latest `started_at` wins when a misbehaving source duplicated the
    /// start.
    async fn find_by_tx(&self, charge_point_id: &str, transaction_id: i32)
    -> Result<Option<Session>>;

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>>;

    async fn list_by_charger(&self, charge_point_id: &str, limit: i64) -> Result<Vec<Session>>;

    /// Records end markers; missing stop/reason keep any prior value.
    async fn end(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
        meter_stop_wh: Option<i64>,
        reason: Option<String>,
    ) -> Result<()>;

    async fn insert_meter_sample(&self, sample: NewMeterSample) -> Result<()>;

    /// Value of the `Energy.Active.Import.Register` reading with the
    /// greatest sample timestamp, unit `Wh` or absent.
    async fn last_register_wh(&self, session_id: Uuid) -> Result<Option<i64>>;

    /// Sum of `Energy.Active.Import.Interval` readings, unit `Wh` or absent.
    async fn interval_sum_wh(&self, session_id: Uuid) -> Result<i64>;

    /// Writes the fallback outcome and stamps `finalized_at`.
    async fn finalize(&self, session_id: Uuid, outcome: &Finalization) -> Result<()>;

    async fn set_pricing(
        &self,
        session_id: Uuid,
        tariff_id: Uuid,
        cost_amount: Decimal,
        cost_currency: &str,
    ) -> Result<()>;
}
