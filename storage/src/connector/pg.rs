use {
    super::{ConnectorState, ConnectorStateRepository},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    sqlx::PgPool,
};

#[derive(Debug, Clone)]
pub struct PgConnectorStateRepository {
    pool: PgPool,
}

impl PgConnectorStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectorStateRepository for PgConnectorStateRepository {
    async fn upsert(&self, state: ConnectorState) -> Result<()> {
        sqlx::query(
            r#"
            insert into connector_state (charge_point_id, connector_id, status, error_code, updated_at)
            values ($1, $2, $3, $4, $5)
            on conflict (charge_point_id, connector_id) do update set
              status = excluded.status,
              error_code = excluded.error_code,
              updated_at = excluded.updated_at
            "#,
        )
        .bind(&state.charge_point_id)
        .bind(state.connector_id)
        .bind(&state.status)
        .bind(&state.error_code)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn list(&self, charge_point_id: &str) -> Result<Vec<ConnectorState>> {
        sqlx::query_as::<_, ConnectorState>(
            r#"
            select charge_point_id, connector_id, status, error_code, updated_at
            from connector_state
            where charge_point_id = $1
            order by connector_id asc
            "#,
        )
        .bind(charge_point_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)
    }
}
