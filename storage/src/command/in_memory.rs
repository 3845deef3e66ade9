// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Command, CommandRepository, CommandStatus, NewCommand},
    async_trait::async_trait,
    chrono::Utc,
    cpms_shared::{Error, Result},
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
    uuid::Uuid,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandRepository {
    commands: Arc<RwLock<HashMap<Uuid, Command>>>,
}

impl InMemoryCommandRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.commands.read().unwrap().len()
    }
}

#[async_trait]
impl CommandRepository for InMemoryCommandRepository {
    async fn create(&self, command: NewCommand) -> Result<Uuid> {
        let mut commands = self.commands.write().unwrap();
        if commands
            .values()
            .any(|c| c.idempotency_key == command.idempotency_key)
        {
            return Err(Error::store("duplicate key value violates unique constraint"));
        }
        let command_id = Uuid::new_v4();
        let now = Utc::now();
        commands.insert(
            command_id,
            Command {
                command_id,
                charge_point_id: command.charge_point_id,
                command_type: command.command_type,
                idempotency_key: command.idempotency_key,
                payload: command.payload,
                status: CommandStatus::Queued.as_str().to_owned(),
                response: None,
                error: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(command_id)
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Command>> {
        Ok(self
            .commands
            .read()
            .unwrap()
            .values()
            .find(|c| c.idempotency_key == key)
            .cloned())
    }

    async fn mark_sent(&self, command_id: Uuid) -> Result<()> {
        if let Some(command) = self.commands.write().unwrap().get_mut(&command_id) {
            command.status = CommandStatus::Sent.as_str().to_owned();
            command.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_acked(&self, command_id: Uuid, response: &str) -> Result<()> {
        if let Some(command) = self.commands.write().unwrap().get_mut(&command_id) {
            command.status = CommandStatus::Acked.as_str().to_owned();
            command.response = Some(response.to_owned());
            command.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(&self, command_id: Uuid, error: &str) -> Result<()> {
        if let Some(command) = self.commands.write().unwrap().get_mut(&command_id) {
            command.status = CommandStatus::Failed.as_str().to_owned();
            command.error = Some(error.to_owned());
            command.updated_at = Utc::now();
        }
        Ok(())
    }
}
