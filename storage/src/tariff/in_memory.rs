// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Tariff, TariffRepository},
    async_trait::async_trait,
    chrono::Utc,
    cpms_shared::Result,
    rust_decimal::Decimal,
    std::sync::{Arc, RwLock},
    uuid::Uuid,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTariffRepository {
    tariffs: Arc<RwLock<Vec<Tariff>>>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self, site_id: Uuid) -> usize {
        self.tariffs
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.site_id == site_id && t.is_active)
            .count()
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn upsert_active_for_site(
        &self,
        site_id: Uuid,
        price_per_kwh: Decimal,
        currency: &str,
    ) -> Result<Uuid> {
        let mut tariffs = self.tariffs.write().unwrap();
        let now = Utc::now();
        for tariff in tariffs.iter_mut().filter(|t| t.site_id == site_id && t.is_active) {
            tariff.is_active = false;
            tariff.updated_at = now;
        }
        let tariff_id = Uuid::new_v4();
        tariffs.push(Tariff {
            tariff_id,
            site_id,
            price_per_kwh,
            currency: currency.to_owned(),
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(tariff_id)
    }

    async fn active_for_site(&self, site_id: Uuid) -> Result<Option<Tariff>> {
        Ok(self
            .tariffs
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.site_id == site_id && t.is_active)
            .max_by_key(|t| t.created_at)
            .cloned())
    }
}
