use {
    super::EventRepository,
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::{Error, Result},
    sqlx::PgPool,
};

#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert_raw(
        &self,
        charge_point_id: &str,
        event_type: &str,
        ts: DateTime<Utc>,
        payload: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into gateway_events (charge_point_id, event_type, ts, payload)
            values ($1, $2, $3, $4)
            "#,
        )
        .bind(charge_point_id)
        .bind(event_type)
        .bind(ts)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }
}
