mod in_memory;
mod pg;

pub use {in_memory::InMemoryConnectorStateRepository, pg::PgConnectorStateRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
};

/// Last reported status of one physical plug on a charger.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ConnectorState {
    pub charge_point_id: String,
    pub connector_id: i32,
    pub status: String,
    pub error_code: String,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ConnectorStateRepository: Send + Sync + 'static {
    /// Creates the `(charge_point_id, connector_id)` row on first sight and
    /// overwrites status and error code afterwards.
    async fn upsert(&self, state: ConnectorState) -> Result<()>;

    async fn list(&self, charge_point_id: &str) -> Result<Vec<ConnectorState>>;
}
