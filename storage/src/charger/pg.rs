use {
    super::{Charger, ChargerRepository, NewCharger},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::{Error, Result},
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Debug, Clone)]
pub struct PgChargerRepository {
    pool: PgPool,
}

impl PgChargerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChargerRepository for PgChargerRepository {
    async fn upsert(&self, charger: NewCharger) -> Result<()> {
        sqlx::query(
            r#"
            insert into chargers (charge_point_id, secret_hash, is_active, vendor, model, ocpp_version)
            values ($1, $2, $3, $4, $5, $6)
            on conflict (charge_point_id) do update set
              secret_hash = excluded.secret_hash,
              is_active = excluded.is_active,
              vendor = excluded.vendor,
              model = excluded.model,
              ocpp_version = excluded.ocpp_version,
              updated_at = now()
            "#,
        )
        .bind(&charger.charge_point_id)
        .bind(&charger.secret_hash)
        .bind(charger.is_active)
        .bind(&charger.vendor)
        .bind(&charger.model)
        .bind(&charger.ocpp_version)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn insert_if_absent(&self, charger: NewCharger) -> Result<()> {
        sqlx::query(
            r#"
            insert into chargers (charge_point_id, secret_hash, is_active, vendor, model, ocpp_version)
            values ($1, $2, $3, $4, $5, $6)
            on conflict (charge_point_id) do nothing
            "#,
        )
        .bind(&charger.charge_point_id)
        .bind(&charger.secret_hash)
        .bind(charger.is_active)
        .bind(&charger.vendor)
        .bind(&charger.model)
        .bind(&charger.ocpp_version)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn get(&self, charge_point_id: &str) -> Result<Option<Charger>> {
        sqlx::query_as::<_, Charger>(
            r#"
            select charge_point_id, secret_hash, is_active, vendor, model, ocpp_version,
                   site_id, created_at, updated_at, last_seen_at
            from chargers
            where charge_point_id = $1
            "#,
        )
        .bind(charge_point_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn touch_last_seen(&self, charge_point_id: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "update chargers set last_seen_at = $2, updated_at = now() where charge_point_id = $1",
        )
        .bind(charge_point_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn site_id(&self, charge_point_id: &str) -> Result<Option<Uuid>> {
        let site: Option<Option<Uuid>> =
            sqlx::query_scalar("select site_id from chargers where charge_point_id = $1")
                .bind(charge_point_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::store)?;
        Ok(site.flatten())
    }

    async fn set_site(&self, charge_point_id: &str, site_id: Uuid) -> Result<()> {
        sqlx::query(
            "update chargers set site_id = $2, updated_at = now() where charge_point_id = $1",
        )
        .bind(charge_point_id)
        .bind(site_id)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }
}
