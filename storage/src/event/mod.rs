mod in_memory;
mod pg;

pub use {in_memory::{InMemoryEventRepository, StoredEvent}, pg::PgEventRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
};

/// Append-only audit log of raw gateway events.
///
/// Rows are written before any state mutation and never read on the runtime
/// path; they exist for replay and forensics.
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
    async fn insert_raw(
        &self,
        charge_point_id: &str,
        event_type: &str,
        ts: DateTime<Utc>,
        payload: &serde_json::Value,
    ) -> Result<()>;
}
