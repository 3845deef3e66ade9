use {
    super::{Settlement, SettlementRepository},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    rust_decimal::Decimal,
    sqlx::PgPool,
    uuid::Uuid,
};

const SETTLEMENT_COLUMNS: &str = r#"
    settlement_id, session_id, site_id, amount, currency, status,
    chain, tx_hash, external_ref, error, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct PgSettlementRepository {
    pool: PgPool,
}

impl PgSettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettlementRepository for PgSettlementRepository {
    async fn upsert_pending(
        &self,
        session_id: Uuid,
        site_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<Uuid> {
        sqlx::query_scalar(
            r#"
            insert into settlements (session_id, site_id, amount, currency, status)
            values ($1, $2, $3, $4, 'Pending')
            on conflict (session_id) do update set updated_at = now()
            returning settlement_id
            "#,
        )
        .bind(session_id)
        .bind(site_id)
        .bind(amount)
        .bind(currency)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn get(&self, settlement_id: Uuid) -> Result<Option<Settlement>> {
        sqlx::query_as::<_, Settlement>(&format!(
            "select {SETTLEMENT_COLUMNS} from settlements where settlement_id = $1",
        ))
        .bind(settlement_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn get_by_session(&self, session_id: Uuid) -> Result<Option<Settlement>> {
        sqlx::query_as::<_, Settlement>(&format!(
            "select {SETTLEMENT_COLUMNS} from settlements where session_id = $1",
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<Settlement>> {
        let query = match status {
            Some(_) => format!(
                r#"
                select {SETTLEMENT_COLUMNS} from settlements
                where status = $2 order by created_at asc limit $1
                "#,
            ),
            None => format!(
                "select {SETTLEMENT_COLUMNS} from settlements order by created_at desc limit $1",
            ),
        };
        let mut q = sqlx::query_as::<_, Settlement>(&query).bind(limit);
        if let Some(status) = status {
            q = q.bind(status);
        }
        q.fetch_all(&self.pool).await.map_err(Error::store)
    }

    async fn mark_submitted(
        &self,
        settlement_id: Uuid,
        chain: &str,
        tx_hash: &str,
        external_ref: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update settlements set
              status = 'Submitted',
              chain = $2,
              tx_hash = $3,
              external_ref = $4,
              error = null,
              updated_at = now()
            where settlement_id = $1
            "#,
        )
        .bind(settlement_id)
        .bind(chain)
        .bind(tx_hash)
        .bind(external_ref)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn mark_confirmed(&self, settlement_id: Uuid) -> Result<()> {
        sqlx::query(
            "update settlements set status = 'Confirmed', updated_at = now() where settlement_id = $1",
        )
        .bind(settlement_id)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn mark_failed(&self, settlement_id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            "update settlements set status = 'Failed', error = $2, updated_at = now() where settlement_id = $1",
        )
        .bind(settlement_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }
}
