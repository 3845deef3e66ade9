// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::EventRepository,
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    std::sync::{Arc, RwLock},
};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub charge_point_id: String,
    pub event_type: String,
    pub ts: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the audit log, oldest first.
    pub fn all(&self) -> Vec<StoredEvent> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert_raw(
        &self,
        charge_point_id: &str,
        event_type: &str,
        ts: DateTime<Utc>,
        payload: &serde_json::Value,
    ) -> Result<()> {
        self.events.write().unwrap().push(StoredEvent {
            charge_point_id: charge_point_id.to_owned(),
            event_type: event_type.to_owned(),
            ts,
            payload: payload.clone(),
        });
        Ok(())
    }
}
