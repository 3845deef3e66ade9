mod in_memory;
mod pg;

pub use {in_memory::InMemoryChargerRepository, pg::PgChargerRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    uuid::Uuid,
};

/// A physical charging station addressed by its `charge_point_id`.
///
/// `secret_hash` is a hex SHA-256 digest; plaintext secrets are never
/// stored. The id is immutable once created.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Charger {
    pub charge_point_id: String,
    pub secret_hash: String,
    pub is_active: bool,
    pub vendor: String,
    pub model: String,
    pub ocpp_version: String,
    pub site_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Attributes for creating or replacing a charger row.
#[derive(Debug, Clone, Default)]
pub struct NewCharger {
    pub charge_point_id: String,
    pub secret_hash: String,
    pub is_active: bool,
    pub vendor: String,
    pub model: String,
    pub ocpp_version: String,
}

#[async_trait]
pub trait ChargerRepository: Send + Sync + 'static {
    /// Creates or fully replaces a charger row. Operator/seed path only.
    async fn upsert(&self, charger: NewCharger) -> Result<()>;

    /// Creates the row only if the id is unseen; an existing row (and its
    /// secret and activation) is left untouched.
    async fn insert_if_absent(&self, charger: NewCharger) -> Result<()>;

    async fn get(&self, charge_point_id: &str) -> Result<Option<Charger>>;

    async fn touch_last_seen(&self, charge_point_id: &str, at: DateTime<Utc>) -> Result<()>;

    async fn site_id(&self, charge_point_id: &str) -> Result<Option<Uuid>>;

    async fn set_site(&self, charge_point_id: &str, site_id: Uuid) -> Result<()>;
}
