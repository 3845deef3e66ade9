mod in_memory;
mod pg;

pub use {in_memory::InMemoryCommandRepository, pg::PgCommandRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    uuid::Uuid,
};

/// An operator command forwarded to the upstream gateway.
///
/// The row is the system of record for retries: `idempotency_key` is unique
/// and a replayed key returns the recorded outcome without a second send.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Command {
    pub command_id: Uuid,
    pub charge_point_id: String,
    #[sqlx(rename = "type")]
    pub command_type: String,
    pub idempotency_key: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub response: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCommand {
    pub charge_point_id: String,
    pub command_type: String,
    pub idempotency_key: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Queued,
    Sent,
    Acked,
    Failed,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Sent => "Sent",
            Self::Acked => "Acked",
            Self::Failed => "Failed",
        }
    }
}

#[async_trait]
pub trait CommandRepository: Send + Sync + 'static {
    /// Inserts the command in `Queued`; a duplicate idempotency key is a
    /// store error (the unique constraint is the serialization backstop).
    async fn create(&self, command: NewCommand) -> Result<Uuid>;

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Command>>;

    async fn mark_sent(&self, command_id: Uuid) -> Result<()>;

    async fn mark_acked(&self, command_id: Uuid, response: &str) -> Result<()>;

    async fn mark_failed(&self, command_id: Uuid, error: &str) -> Result<()>;
}
