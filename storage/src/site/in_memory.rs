// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Site, SiteRepository},
    async_trait::async_trait,
    chrono::Utc,
    cpms_shared::Result,
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
    uuid::Uuid,
};

#[derive(Debug, Clone, Default)]
pub struct InMemorySiteRepository {
    sites: Arc<RwLock<HashMap<Uuid, Site>>>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn create(&self, name: &str) -> Result<Uuid> {
        let mut sites = self.sites.write().unwrap();
        if let Some(existing) = sites.values().find(|s| s.name == name) {
            return Ok(existing.site_id);
        }
        let site_id = Uuid::new_v4();
        sites.insert(
            site_id,
            Site {
                site_id,
                name: name.to_owned(),
                payout_wallet: None,
                created_at: Utc::now(),
            },
        );
        Ok(site_id)
    }

    async fn get(&self, site_id: Uuid) -> Result<Option<Site>> {
        Ok(self.sites.read().unwrap().get(&site_id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Site>> {
        Ok(self
            .sites
            .read()
            .unwrap()
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn set_payout_wallet(&self, site_id: Uuid, wallet: &str) -> Result<()> {
        if let Some(site) = self.sites.write().unwrap().get_mut(&site_id) {
            site.payout_wallet = Some(wallet.to_owned());
        }
        Ok(())
    }

    async fn payout_wallet(&self, site_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .sites
            .read()
            .unwrap()
            .get(&site_id)
            .and_then(|s| s.payout_wallet.clone()))
    }
}
