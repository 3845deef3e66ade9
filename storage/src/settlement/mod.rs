//! Settlement records: the monetary obligation to a site for one priced
//! session. One settlement per session, enforced by a unique constraint;
//! transitions are driven by operator calls and validated upstream.

mod in_memory;
mod pg;

pub use {in_memory::InMemorySettlementRepository, pg::PgSettlementRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::{Error, Result},
    rust_decimal::Decimal,
    std::str::FromStr,
    uuid::Uuid,
};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Settlement {
    pub settlement_id: Uuid,
    pub session_id: Uuid,
    pub site_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub chain: Option<String>,
    pub tx_hash: Option<String>,
    pub external_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStatus {
    Pending,
    Submitted,
    Confirmed,
    Failed,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Submitted => "Submitted",
            Self::Confirmed => "Confirmed",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for SettlementStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Submitted" => Ok(Self::Submitted),
            "Confirmed" => Ok(Self::Confirmed),
            "Failed" => Ok(Self::Failed),
            other => Err(Error::invalid_input(format!("unknown settlement status `{other}`"))),
        }
    }
}

#[async_trait]
pub trait SettlementRepository: Send + Sync + 'static {
    /// Creates a `Pending` settlement for the session, or touches the
    /// existing row's `updated_at` (uniqueness on `session_id`).
    async fn upsert_pending(
        &self,
        session_id: Uuid,
        site_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<Uuid>;

    async fn get(&self, settlement_id: Uuid) -> Result<Option<Settlement>>;

    async fn get_by_session(&self, session_id: Uuid) -> Result<Option<Settlement>>;

    async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<Settlement>>;

    async fn mark_submitted(
        &self,
        settlement_id: Uuid,
        chain: &str,
        tx_hash: &str,
        external_ref: Option<&str>,
    ) -> Result<()>;

    async fn mark_confirmed(&self, settlement_id: Uuid) -> Result<()>;

    async fn mark_failed(&self, settlement_id: Uuid, error: &str) -> Result<()>;
}
