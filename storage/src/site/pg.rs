use {
    super::{Site, SiteRepository},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Debug, Clone)]
pub struct PgSiteRepository {
    pool: PgPool,
}

impl PgSiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteRepository for PgSiteRepository {
    async fn create(&self, name: &str) -> Result<Uuid> {
        sqlx::query_scalar(
            r#"
            insert into sites (name) values ($1)
            on conflict (name) do update set name = excluded.name
            returning site_id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn get(&self, site_id: Uuid) -> Result<Option<Site>> {
        sqlx::query_as::<_, Site>(
            "select site_id, name, payout_wallet, created_at from sites where site_id = $1",
        )
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Site>> {
        sqlx::query_as::<_, Site>(
            "select site_id, name, payout_wallet, created_at from sites where name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn set_payout_wallet(&self, site_id: Uuid, wallet: &str) -> Result<()> {
        sqlx::query("update sites set payout_wallet = $2 where site_id = $1")
            .bind(site_id)
            .bind(wallet)
            .execute(&self.pool)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn payout_wallet(&self, site_id: Uuid) -> Result<Option<String>> {
        let wallet: Option<Option<String>> =
            sqlx::query_scalar("select payout_wallet from sites where site_id = $1")
                .bind(site_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::store)?;
        Ok(wallet.flatten())
    }
}
