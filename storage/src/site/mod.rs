mod in_memory;
mod pg;

pub use {in_memory::InMemorySiteRepository, pg::PgSiteRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    uuid::Uuid,
};

/// A physical location owning chargers; the payout wallet is an opaque
/// downstream identifier.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Site {
    pub site_id: Uuid,
    pub name: String,
    pub payout_wallet: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SiteRepository: Send + Sync + 'static {
    /// Creates a site, or returns the existing id for a known name.
    async fn create(&self, name: &str) -> Result<Uuid>;

    async fn get(&self, site_id: Uuid) -> Result<Option<Site>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Site>>;

    async fn set_payout_wallet(&self, site_id: Uuid, wallet: &str) -> Result<()>;

    async fn payout_wallet(&self, site_id: Uuid) -> Result<Option<String>>;
}
