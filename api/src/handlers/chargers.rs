use {
    crate::{
        reply::{error_reply, json_with_status},
        schema::{ChargerResponse, ConnectorResponse, LimitQuery, SessionResponse},
    },
    cpms_app::{Application, Dependencies},
    std::{convert::Infallible, sync::Arc},
    warp::{http::StatusCode, reply::Reply},
};

pub async fn get<D: Dependencies>(
    charge_point_id: String,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.charger(&charge_point_id).await {
        Ok(charger) => Ok(json_with_status(StatusCode::OK, &ChargerResponse::from(charger))
            .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn list_connectors<D: Dependencies>(
    charge_point_id: String,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.list_connectors(&charge_point_id).await {
        Ok(connectors) => {
            let items: Vec<ConnectorResponse> =
                connectors.into_iter().map(ConnectorResponse::from).collect();
            Ok(json_with_status(StatusCode::OK, &items).into_response())
        }
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn list_sessions<D: Dependencies>(
    charge_point_id: String,
    query: LimitQuery,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.sessions_by_charger(&charge_point_id, query.limit).await {
        Ok(sessions) => {
            let items: Vec<SessionResponse> =
                sessions.into_iter().map(SessionResponse::from).collect();
            Ok(json_with_status(StatusCode::OK, &items).into_response())
        }
        Err(error) => Ok(error_reply(&error)),
    }
}
