use {
    crate::{
        reply::{error_reply, json_with_status},
        schema::{AuthRequest, AuthResponse},
    },
    cpms_app::{Application, Dependencies},
    cpms_shared::Error,
    std::{convert::Infallible, sync::Arc},
    warp::{http::StatusCode, reply::Reply},
};

pub async fn authenticate<D: Dependencies>(
    charge_point_id: String,
    request: AuthRequest,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app
        .authenticate_charger(&charge_point_id, &request.presented_secret)
        .await
    {
        Ok(auth) => Ok(json_with_status(
            StatusCode::OK,
            &AuthResponse { allowed: true, ocpp_version: Some(auth.ocpp_version) },
        )
        .into_response()),
        Err(Error::AuthFailure) => Ok(json_with_status(
            StatusCode::UNAUTHORIZED,
            &AuthResponse { allowed: false, ocpp_version: None },
        )
        .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}
