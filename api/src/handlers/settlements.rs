use {
    crate::{
        reply::{error_reply, json_with_status},
        schema::{ListQuery, MarkFailedBody, MarkSubmittedBody, SettlementResponse},
    },
    cpms_app::{Application, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    uuid::Uuid,
    warp::{http::StatusCode, reply::Reply},
};

pub async fn list<D: Dependencies>(
    query: ListQuery,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app
        .settlements_list(query.status.as_deref().filter(|s| !s.is_empty()), query.limit)
        .await
    {
        Ok(settlements) => {
            let items: Vec<SettlementResponse> =
                settlements.into_iter().map(SettlementResponse::from).collect();
            Ok(json_with_status(StatusCode::OK, &json!({"items": items})).into_response())
        }
        Err(error) => Ok(error_reply(&error)),
    }
}

fn no_content() -> warp::reply::Response {
    warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response()
}

pub async fn mark_submitted<D: Dependencies>(
    settlement_id: Uuid,
    body: MarkSubmittedBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app
        .mark_settlement_submitted(
            settlement_id,
            &body.chain,
            &body.tx_hash,
            body.external_ref.as_deref(),
        )
        .await
    {
        Ok(()) => Ok(no_content()),
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn mark_confirmed<D: Dependencies>(
    settlement_id: Uuid,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.mark_settlement_confirmed(settlement_id).await {
        Ok(()) => Ok(no_content()),
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn mark_failed<D: Dependencies>(
    settlement_id: Uuid,
    body: MarkFailedBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    let error_message = body.error.filter(|e| !e.is_empty()).unwrap_or_else(|| "failed".to_owned());
    match app.mark_settlement_failed(settlement_id, &error_message).await {
        Ok(()) => Ok(no_content()),
        Err(error) => Ok(error_reply(&error)),
    }
}
