use {
    crate::{
        reply::{error_reply, json_with_status},
        schema::{CreateSiteBody, TariffBody, WalletBody},
    },
    cpms_app::{Application, Dependencies},
    serde_json::json,
    std::{convert::Infallible, sync::Arc},
    uuid::Uuid,
    warp::{http::StatusCode, reply::Reply},
};

pub async fn create<D: Dependencies>(
    body: CreateSiteBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.create_site(&body.name).await {
        Ok(site_id) => Ok(json_with_status(
            StatusCode::OK,
            &json!({"siteId": site_id, "name": body.name}),
        )
        .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn upsert_tariff<D: Dependencies>(
    site_id: Uuid,
    body: TariffBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    let currency = body.currency.filter(|c| !c.is_empty()).unwrap_or_else(|| "USD".to_owned());
    match app.upsert_site_tariff(site_id, body.price_per_kwh, &currency).await {
        Ok(tariff_id) => Ok(json_with_status(
            StatusCode::OK,
            &json!({
                "tariffId": tariff_id,
                "siteId": site_id,
                "pricePerKwh": body.price_per_kwh,
                "currency": currency,
                "isActive": true,
            }),
        )
        .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}

pub async fn set_wallet<D: Dependencies>(
    site_id: Uuid,
    body: WalletBody,
    app: Arc<Application<D>>,
) -> Result<warp::reply::Response, Infallible> {
    match app.set_site_wallet(site_id, &body.wallet).await {
        Ok(()) => Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT)
            .into_response()),
        Err(error) => Ok(error_reply(&error)),
    }
}
