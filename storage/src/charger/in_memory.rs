// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Charger, ChargerRepository, NewCharger},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
    uuid::Uuid,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryChargerRepository {
    chargers: Arc<RwLock<HashMap<String, Charger>>>,
}

impl InMemoryChargerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn materialize(charger: NewCharger) -> Charger {
        let now = Utc::now();
        Charger {
            charge_point_id: charger.charge_point_id,
            secret_hash: charger.secret_hash,
            is_active: charger.is_active,
            vendor: charger.vendor,
            model: charger.model,
            ocpp_version: charger.ocpp_version,
            site_id: None,
            created_at: now,
            updated_at: now,
            last_seen_at: None,
        }
    }
}

#[async_trait]
impl ChargerRepository for InMemoryChargerRepository {
    async fn upsert(&self, charger: NewCharger) -> Result<()> {
        let mut chargers = self.chargers.write().unwrap();
        let site_id = chargers.get(&charger.charge_point_id).and_then(|c| c.site_id);
        let mut row = Self::materialize(charger);
        row.site_id = site_id;
        chargers.insert(row.charge_point_id.clone(), row);
        Ok(())
    }

    async fn insert_if_absent(&self, charger: NewCharger) -> Result<()> {
        let mut chargers = self.chargers.write().unwrap();
        chargers
            .entry(charger.charge_point_id.clone())
            .or_insert_with(|| Self::materialize(charger));
        Ok(())
    }

    async fn get(&self, charge_point_id: &str) -> Result<Option<Charger>> {
        Ok(self.chargers.read().unwrap().get(charge_point_id).cloned())
    }

    async fn touch_last_seen(&self, charge_point_id: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(charger) = self.chargers.write().unwrap().get_mut(charge_point_id) {
            charger.last_seen_at = Some(at);
            charger.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn site_id(&self, charge_point_id: &str) -> Result<Option<Uuid>> {
        Ok(self
            .chargers
            .read()
            .unwrap()
            .get(charge_point_id)
            .and_then(|c| c.site_id))
    }

    async fn set_site(&self, charge_point_id: &str, site_id: Uuid) -> Result<()> {
        if let Some(charger) = self.chargers.write().unwrap().get_mut(charge_point_id) {
            charger.site_id = Some(site_id);
        }
        Ok(())
    }
}
