// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{ConnectorState, ConnectorStateRepository},
    async_trait::async_trait,
    cpms_shared::Result,
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectorStateRepository {
    connectors: Arc<RwLock<HashMap<(String, i32), ConnectorState>>>,
}

impl InMemoryConnectorStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectorStateRepository for InMemoryConnectorStateRepository {
    async fn upsert(&self, state: ConnectorState) -> Result<()> {
        self.connectors
            .write()
            .unwrap()
            .insert((state.charge_point_id.clone(), state.connector_id), state);
        Ok(())
    }

    async fn list(&self, charge_point_id: &str) -> Result<Vec<ConnectorState>> {
        let mut connectors: Vec<ConnectorState> = self
            .connectors
            .read()
            .unwrap()
            .values()
            .filter(|c| c.charge_point_id == charge_point_id)
            .cloned()
            .collect();
        connectors.sort_by_key(|c| c.connector_id);
        Ok(connectors)
    }
}
