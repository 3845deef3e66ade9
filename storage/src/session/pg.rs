use {
    super::{Finalization, NewMeterSample, NewSession, Session, SessionRepository},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::{Error, Result},
    rust_decimal::Decimal,
    sqlx::PgPool,
    uuid::Uuid,
};

const SESSION_COLUMNS: &str = r#"
    session_id, charge_point_id, connector_id, transaction_id, id_tag,
    started_at, ended_at, meter_start_wh, meter_stop_wh, reason,
    energy_wh, energy_source, is_estimated, finalized_at,
    tariff_id, cost_amount, cost_currency
"#;

#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn start(&self, session: NewSession) -> Result<Uuid> {
        sqlx::query_scalar(
            r#"
            insert into sessions (charge_point_id, connector_id, transaction_id, id_tag, started_at, meter_start_wh)
            values ($1, $2, $3, $4, $5, $6)
            returning session_id
            "#,
        )
        .bind(&session.charge_point_id)
        .bind(session.connector_id)
        .bind(session.transaction_id)
        .bind(&session.id_tag)
        .bind(session.started_at)
        .bind(session.meter_start_wh)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn find_by_tx(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> Result<Option<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            r#"
            select {SESSION_COLUMNS}
            from sessions
            where charge_point_id = $1 and transaction_id = $2
            order by started_at desc
            limit 1
            "#,
        ))
        .bind(charge_point_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "select {SESSION_COLUMNS} from sessions where session_id = $1",
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn list_by_charger(&self, charge_point_id: &str, limit: i64) -> Result<Vec<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            r#"
            select {SESSION_COLUMNS}
            from sessions
            where charge_point_id = $1
            order by started_at desc
            limit $2
            "#,
        ))
        .bind(charge_point_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn end(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
        meter_stop_wh: Option<i64>,
        reason: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update sessions set
              ended_at = $2,
              meter_stop_wh = coalesce($3, meter_stop_wh),
              reason = coalesce($4, reason),
              updated_at = now()
            where session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(ended_at)
        .bind(meter_stop_wh)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn insert_meter_sample(&self, sample: NewMeterSample) -> Result<()> {
        sqlx::query(
            r#"
            insert into meter_samples (session_id, charge_point_id, transaction_id, ts, samples_json)
            values ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sample.session_id)
        .bind(&sample.charge_point_id)
        .bind(sample.transaction_id)
        .bind(sample.ts)
        .bind(&sample.samples_json)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn last_register_wh(&self, session_id: Uuid) -> Result<Option<i64>> {
        sqlx::query_scalar(
            r#"
            with candidates as (
              select ms.ts, (s->>'value')::bigint as v
              from meter_samples ms,
                   jsonb_array_elements(ms.samples_json->'samples') s
              where ms.session_id = $1
                and s->>'measurand' = 'Energy.Active.Import.Register'
                and (s->>'unit' is null or s->>'unit' = 'Wh')
            )
            select v from candidates order by ts desc limit 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn interval_sum_wh(&self, session_id: Uuid) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            with candidates as (
              select (s->>'value')::bigint as v
              from meter_samples ms,
                   jsonb_array_elements(ms.samples_json->'samples') s
              where ms.session_id = $1
                and s->>'measurand' = 'Energy.Active.Import.Interval'
                and (s->>'unit' is null or s->>'unit' = 'Wh')
            )
            select coalesce(sum(v), 0)::bigint from candidates
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn finalize(&self, session_id: Uuid, outcome: &Finalization) -> Result<()> {
        sqlx::query(
            r#"
            update sessions set
              meter_stop_wh = coalesce(meter_stop_wh, $2),
              energy_wh = $3,
              energy_source = $4,
              is_estimated = $5,
              finalized_at = now(),
              updated_at = now()
            where session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(outcome.backfill_meter_stop_wh)
        .bind(outcome.energy_wh)
        .bind(outcome.source.as_str())
        .bind(outcome.is_estimated)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn set_pricing(
        &self,
        session_id: Uuid,
        tariff_id: Uuid,
        cost_amount: Decimal,
        cost_currency: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update sessions set
              tariff_id = $2,
              cost_amount = $3,
              cost_currency = $4,
              updated_at = now()
            where session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(tariff_id)
        .bind(cost_amount)
        .bind(cost_currency)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }
}
