//! Mapping from the shared error taxonomy onto HTTP replies.

use {
    cpms_shared::Error,
    serde_json::json,
    warp::{
        http::StatusCode,
        reply::{Json, Reply, Response, WithStatus},
    },
};

pub fn json_with_status(status: StatusCode, body: &impl serde::Serialize) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

pub fn error_reply(error: &Error) -> Response {
    let status = match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::AuthFailure => StatusCode::UNAUTHORIZED,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Upstream(_) | Error::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
        Error::StateConflict(_) => StatusCode::CONFLICT,
    };
    // Store failures are opaque to callers; details stay in the logs.
    let message = match error {
        Error::Store(_) => "db error".to_owned(),
        other => other.to_string(),
    };
    json_with_status(status, &json!({"error": message})).into_response()
}

/// Gateway bodies are embedded verbatim when they parse as JSON and as a
/// plain string otherwise.
pub fn raw_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_owned()))
}
