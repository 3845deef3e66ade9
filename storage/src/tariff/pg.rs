use {
    super::{Tariff, TariffRepository},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    rust_decimal::Decimal,
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Debug, Clone)]
pub struct PgTariffRepository {
    pool: PgPool,
}

impl PgTariffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TariffRepository for PgTariffRepository {
    async fn upsert_active_for_site(
        &self,
        site_id: Uuid,
        price_per_kwh: Decimal,
        currency: &str,
    ) -> Result<Uuid> {
        let mut tx = self.pool.begin().await.map_err(Error::store)?;
        sqlx::query(
            "update tariffs set is_active = false, updated_at = now() where site_id = $1 and is_active",
        )
        .bind(site_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::store)?;
        let tariff_id: Uuid = sqlx::query_scalar(
            r#"
            insert into tariffs (site_id, price_per_kwh, currency, is_active)
            values ($1, $2, $3, true)
            returning tariff_id
            "#,
        )
        .bind(site_id)
        .bind(price_per_kwh)
        .bind(currency)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::store)?;
        tx.commit().await.map_err(Error::store)?;
        Ok(tariff_id)
    }

    async fn active_for_site(&self, site_id: Uuid) -> Result<Option<Tariff>> {
        sqlx::query_as::<_, Tariff>(
            r#"
            select tariff_id, site_id, price_per_kwh, currency, is_active, created_at, updated_at
            from tariffs
            where site_id = $1 and is_active
            order by created_at desc
            limit 1
            "#,
        )
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }
}
