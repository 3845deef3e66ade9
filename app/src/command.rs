//! Idempotent operator command fan-out to the upstream gateway.

use {
    crate::{Application, Dependencies},
    cpms_gateway::GatewayApi,
    cpms_shared::{Error, Result},
    cpms_storage::{Command, CommandRepository, NewCommand},
    uuid::Uuid,
};

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub command_type: String,
    pub charge_point_id: String,
    pub idempotency_key: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// A command with the same idempotency key already ran; its recorded
    /// outcome is returned and the gateway is not contacted.
    Replayed(Command),
    Acked { command_id: Uuid, response: String },
    /// The gateway answered outside 2xx; the command is `Failed` and the
    /// gateway's verdict is passed through.
    Rejected { command_id: Uuid, gateway_status: u16, gateway_body: String },
}

impl<D: Dependencies> Application<D> {
    /// Persists and forwards one operator command.
    ///
    /// The command row is the system of record for retries: a replayed
    /// idempotency key short-circuits to the stored outcome. There is no
    /// lock around the first dispatch, so two racing first-time calls may
    /// both reach the gateway; the unique key constraint still serializes
    /// the durable outcome to exactly one row.
    pub async fn create_and_send_command(&self, request: CommandRequest) -> Result<CommandOutcome> {
        if request.command_type.is_empty()
            || request.charge_point_id.is_empty()
            || request.idempotency_key.is_empty()
        {
            return Err(Error::invalid_input("missing type/chargePointId/idempotencyKey"));
        }

        if let Some(existing) =
            self.commands.find_by_idempotency_key(&request.idempotency_key).await?
        {
            return Ok(CommandOutcome::Replayed(existing));
        }

        let forward_body = serde_json::json!({
            "type": request.command_type,
            "chargePointId": request.charge_point_id,
            "idempotencyKey": request.idempotency_key,
            "payload": request.payload,
        });

        let command_id = self
            .commands
            .create(NewCommand {
                charge_point_id: request.charge_point_id,
                command_type: request.command_type,
                idempotency_key: request.idempotency_key,
                payload: forward_body.clone(),
            })
            .await?;

        self.commands.mark_sent(command_id).await?;

        match self.gateway.send_command(&forward_body).await {
            Err(error) => {
                self.commands.mark_failed(command_id, &error.to_string()).await?;
                Err(error)
            }
            Ok(reply) if !reply.is_success() => {
                self.commands.mark_failed(command_id, &reply.body).await?;
                Ok(CommandOutcome::Rejected {
                    command_id,
                    gateway_status: reply.status,
                    gateway_body: reply.body,
                })
            }
            Ok(reply) => {
                self.commands.mark_acked(command_id, &reply.body).await?;
                Ok(CommandOutcome::Acked { command_id, response: reply.body })
            }
        }
    }
}
