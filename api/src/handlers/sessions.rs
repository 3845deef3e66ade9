use {
    crate::{
        reply::{error_reply, json_with_status},
        schema::{FinalizeQuery, SessionResponse},
    },
    cpms_app::{Application, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    uuid::Uuid,
    warp::{http::StatusCode, reply::Reply},
};

pub async fn get<D: Dependencies>(
    session_id: Uuid,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.session(session_id).await {
        Ok(session) => Ok(json_with_status(StatusCode::OK, &SessionResponse::from(session))
            .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}

/// Triggers the finalizer; `?force=true` bypasses the already-finalized
/// guard. Replies with the refreshed session.
pub async fn finalize<D: Dependencies>(
    session_id: Uuid,
    query: FinalizeQuery,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    let force = query.force.unwrap_or(false);
    let finalized = if force {
        app.finalize_forced(session_id).await
    } else {
        app.finalize_with_fallback(session_id).await
    };
    if let Err(error) = finalized {
        return Ok(error_reply(&error));
    }

    match app.session(session_id).await {
        Ok(session) => Ok(json_with_status(
            StatusCode::OK,
            &json!({"session": SessionResponse::from(session), "force": force}),
        )
        .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}
