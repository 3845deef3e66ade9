use {
    crate::reply::error_reply,
    bytes::Bytes,
    cpms_app::{Application, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    warp::{http::StatusCode, reply::Reply},
};

pub async fn ingest<D: Dependencies>(
    raw: Bytes,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.ingest(&raw).await {
        Ok(event_type) => Ok(crate::reply::json_with_status(
            StatusCode::ACCEPTED,
            &json!({"accepted": true, "type": event_type}),
        )
        .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}
