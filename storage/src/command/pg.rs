use {
    super::{Command, CommandRepository, CommandStatus, NewCommand},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Debug, Clone)]
pub struct PgCommandRepository {
    pool: PgPool,
}

impl PgCommandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommandRepository for PgCommandRepository {
    async fn create(&self, command: NewCommand) -> Result<Uuid> {
        sqlx::query_scalar(
            r#"
            insert into commands (charge_point_id, type, idempotency_key, payload, status)
            values ($1, $2, $3, $4, $5)
            returning command_id
            "#,
        )
        .bind(&command.charge_point_id)
        .bind(&command.command_type)
        .bind(&command.idempotency_key)
        .bind(&command.payload)
        .bind(CommandStatus::Queued.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Command>> {
        sqlx::query_as::<_, Command>(
            r#"
            select command_id, charge_point_id, type, idempotency_key, payload,
                   status, response, error, created_at, updated_at
            from commands
            where idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::store)
    }

    async fn mark_sent(&self, command_id: Uuid) -> Result<()> {
        sqlx::query("update commands set status = 'Sent', updated_at = now() where command_id = $1")
            .bind(command_id)
            .execute(&self.pool)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn mark_acked(&self, command_id: Uuid, response: &str) -> Result<()> {
        sqlx::query(
            "update commands set status = 'Acked', response = $2, updated_at = now() where command_id = $1",
        )
        .bind(command_id)
        .bind(response)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }

    async fn mark_failed(&self, command_id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            "update commands set status = 'Failed', error = $2, updated_at = now() where command_id = $1",
        )
        .bind(command_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(Error::store)?;
        Ok(())
    }
}
