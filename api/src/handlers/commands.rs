use {
    crate::{
        reply::{error_reply, json_with_status, raw_json},
        schema::CommandBody,
    },
    cpms_app::{Application, CommandOutcome, CommandRequest, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    warp::{http::StatusCode, reply::Reply},
};

pub async fn create_and_send<D: Dependencies>(
    body: CommandBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    let request = CommandRequest {
        command_type: body.command_type,
        charge_point_id: body.charge_point_id,
        idempotency_key: body.idempotency_key,
        payload: body.payload.unwrap_or_else(|| json!({})),
    };

    let reply = match app.create_and_send_command(request).await {
        Ok(CommandOutcome::Acked { command_id, response }) => json_with_status(
            StatusCode::OK,
            &json!({
                "commandId": command_id,
                "status": "Acked",
                "gatewayResponse": raw_json(&response),
            }),
        )
        .into_response(),
        Ok(CommandOutcome::Replayed(command)) => json_with_status(
            StatusCode::OK,
            &json!({
                "commandId": command.command_id,
                "status": command.status,
                "response": command.response.as_deref().map(raw_json),
                "error": command.error,
            }),
        )
        .into_response(),
        Ok(CommandOutcome::Rejected { command_id, gateway_status, gateway_body }) => {
            json_with_status(
                StatusCode::BAD_GATEWAY,
                &json!({
                    "commandId": command_id,
                    "status": "Failed",
                    "gatewayStatus": gateway_status,
                    "gatewayBody": raw_json(&gateway_body),
                }),
            )
            .into_response()
        }
        Err(error) => error_reply(&error),
    };
    Ok(reply)
}
