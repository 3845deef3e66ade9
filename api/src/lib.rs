//! The HTTP ingress surface.
//!
//! One warp route tree exposes the gateway-facing contracts (event intake,
//! charger auth), the operator surface (commands, finalize, sites, tariffs,
//! settlement marks) and the read projections. Handlers never reject; every
//! service error is mapped onto a status code here, so rejections only ever
//! mean missing route, failed bearer auth or a malformed frame.

use {
    cpms_app::{Application, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    uuid::Uuid,
    warp::{Filter, Rejection, http::StatusCode, reply::Reply},
};

pub mod reply;
pub mod schema;

mod handlers;
#[cfg(test)]
mod tests;

/// One event envelope is capped at 2 MiB.
pub const MAX_EVENT_BYTES: u64 = 2 << 20;

#[derive(Debug)]
struct Unauthorized;

impl warp::reject::Reject for Unauthorized {}

/// Bearer guard for the `/v1/gateway/*` trust boundary. An empty expected
/// token disables the check (dev mode).
fn require_bearer(
    expected: String,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(move |header: Option<String>| {
            let expected = expected.clone();
            async move {
                if expected.is_empty() {
                    return Ok(());
                }
                match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
                    Some(token) if token == expected => Ok(()),
                    _ => Err(warp::reject::custom(Unauthorized)),
                }
            }
        })
        .untuple_one()
}

fn with_app<D: Dependencies>(
    app: Arc<Application<D>>,
) -> impl Filter<Extract = (Arc<Application<D>>,), Error = Infallible> + Clone {
    warp::any().map(move || app.clone())
}

pub fn routes<D: Dependencies>(
    app: Arc<Application<D>>,
    gateway_api_key: String,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let bearer = require_bearer(gateway_api_key);

    let ingest_event = warp::path!("v1" / "gateway" / "events")
        .and(warp::post())
        .and(bearer.clone())
        .and(warp::body::content_length_limit(MAX_EVENT_BYTES))
        .and(warp::body::bytes())
        .and(with_app(app.clone()))
        .and_then(handlers::events::ingest);

    let auth_charger = warp::path!("v1" / "gateway" / "chargers" / String / "auth")
        .and(warp::post())
        .and(bearer)
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::auth::authenticate);

    let create_command = warp::path!("v1" / "commands")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::commands::create_and_send);

    let finalize_session = warp::path!("v1" / "sessions" / Uuid / "finalize")
        .and(warp::post())
        .and(warp::query::<schema::FinalizeQuery>())
        .and(with_app(app.clone()))
        .and_then(handlers::sessions::finalize);

    let get_session = warp::path!("v1" / "sessions" / Uuid)
        .and(warp::get())
        .and(with_app(app.clone()))
        .and_then(handlers::sessions::get);

    let get_charger = warp::path!("v1" / "chargers" / String)
        .and(warp::get())
        .and(with_app(app.clone()))
        .and_then(handlers::chargers::get);

    let list_connectors = warp::path!("v1" / "chargers" / String / "connectors")
        .and(warp::get())
        .and(with_app(app.clone()))
        .and_then(handlers::chargers::list_connectors);

    let list_sessions = warp::path!("v1" / "chargers" / String / "sessions")
        .and(warp::get())
        .and(warp::query::<schema::LimitQuery>())
        .and(with_app(app.clone()))
        .and_then(handlers::chargers::list_sessions);

    let list_settlements = warp::path!("v1" / "settlements")
        .and(warp::get())
        .and(warp::query::<schema::ListQuery>())
        .and(with_app(app.clone()))
        .and_then(handlers::settlements::list);

    let settlement_submitted = warp::path!("v1" / "settlements" / Uuid / "submitted")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::settlements::mark_submitted);

    let settlement_confirmed = warp::path!("v1" / "settlements" / Uuid / "confirmed")
        .and(warp::post())
        .and(with_app(app.clone()))
        .and_then(handlers::settlements::mark_confirmed);

    let settlement_failed = warp::path!("v1" / "settlements" / Uuid / "failed")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::settlements::mark_failed);

    let create_site = warp::path!("v1" / "sites")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::sites::create);

    let upsert_tariff = warp::path!("v1" / "sites" / Uuid / "tariffs")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_app(app.clone()))
        .and_then(handlers::sites::upsert_tariff);

    let set_wallet = warp::path!("v1" / "sites" / Uuid / "wallet")
        .and(warp::put())
        .and(warp::body::json())
        .and(with_app(app))
        .and_then(handlers::sites::set_wallet);

    let healthz = warp::path!("healthz").and(warp::get()).map(|| StatusCode::OK);

    ingest_event
        .or(auth_charger)
        .or(create_command)
        .or(finalize_session)
        .or(get_session)
        .or(list_connectors)
        .or(list_sessions)
        .or(get_charger)
        .or(list_settlements)
        .or(settlement_submitted)
        .or(settlement_confirmed)
        .or(settlement_failed)
        .or(upsert_tariff)
        .or(set_wallet)
        .or(create_site)
        .or(healthz)
        .recover(handle_rejection)
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if rejection.find::<Unauthorized>().is_some() {
        (StatusCode::UNAUTHORIZED, "unauthorized")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::BAD_REQUEST, "body too large")
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::BAD_REQUEST, "missing content length")
    } else if rejection.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid json")
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid query")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else {
        tracing::error!(?rejection, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };
    Ok(reply::json_with_status(status, &json!({"error": message})))
}
