mod in_memory;
mod pg;

pub use {in_memory::InMemoryTariffRepository, pg::PgTariffRepository};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    rust_decimal::Decimal,
    uuid::Uuid,
};

/// Per-site price per kilowatt-hour. At most one tariff per site is active;
/// history is kept by deactivating, never deleting.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Tariff {
    pub tariff_id: Uuid,
    pub site_id: Uuid,
    pub price_per_kwh: Decimal,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait TariffRepository: Send + Sync + 'static {
    /// Deactivates any currently active tariff for the site and installs the
    /// new one as active, atomically.
    async fn upsert_active_for_site(
        &self,
        site_id: Uuid,
        price_per_kwh: Decimal,
        currency: &str,
    ) -> Result<Uuid>;

    async fn active_for_site(&self, site_id: Uuid) -> Result<Option<Tariff>>;
}
