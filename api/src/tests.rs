use {
    super::routes,
    cpms_app::{Application, Dependencies},
    cpms_gateway::{GatewayReply, RecordingGateway},
    cpms_shared::secrets,
    cpms_storage::{
        ChargerRepository, InMemoryChargerRepository, InMemoryCommandRepository,
        InMemoryConnectorStateRepository, InMemoryEventRepository, InMemorySessionRepository,
        InMemorySettlementRepository, InMemorySiteRepository, InMemoryTariffRepository,
        NewCharger, SessionRepository, SiteRepository, TariffRepository,
    },
    rust_decimal::Decimal,
    serde_json::{Value, json},
    std::{sync::Arc, time::Duration},
};

struct TestDependencies;

impl Dependencies for TestDependencies {
    type Chargers = InMemoryChargerRepository;
    type Connectors = InMemoryConnectorStateRepository;
    type Events = InMemoryEventRepository;
    type Sessions = InMemorySessionRepository;
    type Sites = InMemorySiteRepository;
    type Tariffs = InMemoryTariffRepository;
    type Settlements = InMemorySettlementRepository;
    type Commands = InMemoryCommandRepository;
    type Gateway = RecordingGateway;
}

fn create_app(gateway: RecordingGateway) -> Arc<Application<TestDependencies>> {
    Arc::new(Application {
        chargers: InMemoryChargerRepository::new(),
        connectors: InMemoryConnectorStateRepository::new(),
        events: InMemoryEventRepository::new(),
        sessions: InMemorySessionRepository::new(),
        sites: InMemorySiteRepository::new(),
        tariffs: InMemoryTariffRepository::new(),
        settlements: InMemorySettlementRepository::new(),
        commands: InMemoryCommandRepository::new(),
        gateway,
        max_event_skew: Duration::ZERO,
    })
}

async fn seed_priced_charger(app: &Application<TestDependencies>, cp: &str) {
    let site_id = app.sites.create("Depot A").await.expect("site created");
    app.tariffs
        .upsert_active_for_site(site_id, Decimal::new(25, 2), "USD")
        .await
        .expect("tariff installed");
    app.chargers
        .upsert(NewCharger {
            charge_point_id: cp.to_owned(),
            secret_hash: secrets::hash_secret("devsecret"),
            is_active: true,
            vendor: "ABB".to_owned(),
            model: "Terra54".to_owned(),
            ocpp_version: "1.6J".to_owned(),
        })
        .await
        .expect("charger seeded");
    app.chargers.set_site(cp, site_id).await.expect("site linked");
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response is json")
}

#[tokio::test]
async fn test_healthz_is_ok() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request().method("GET").path("/healthz").reply(&api).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_ingest_event_is_accepted() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .body(json!({"type": "ChargerHeartbeat", "chargePointId": "CP-1"}).to_string())
        .reply(&api)
        .await;

    assert_eq!(response.status(), 202);
    assert_eq!(
        body_json(response.body()),
        json!({"accepted": true, "type": "ChargerHeartbeat"})
    );
}

#[tokio::test]
async fn test_ingest_rejects_bad_envelopes() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .body(json!({"chargePointId": "CP-1"}).to_string())
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_gateway_routes_require_the_bearer_token() {
    let app = create_app(RecordingGateway::acking("{}"));
    let api = routes(app, "gw-key".to_owned());
    let event = json!({"type": "ChargerHeartbeat", "chargePointId": "CP-1"}).to_string();

    let denied = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .body(event.clone())
        .reply(&api)
        .await;
    assert_eq!(denied.status(), 401);

    let wrong = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .header("authorization", "Bearer other")
        .body(event.clone())
        .reply(&api)
        .await;
    assert_eq!(wrong.status(), 401);

    let allowed = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .header("authorization", "Bearer gw-key")
        .body(event)
        .reply(&api)
        .await;
    assert_eq!(allowed.status(), 202);
}

#[tokio::test]
async fn test_oversized_event_body_is_rejected() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .body(vec![b'a'; (super::MAX_EVENT_BYTES + 1) as usize])
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_charger_auth_round_trip() {
    let app = create_app(RecordingGateway::acking("{}"));
    seed_priced_charger(&app, "CP-1").await;
    let api = routes(app, String::new());

    let allowed = warp::test::request()
        .method("POST")
        .path("/v1/gateway/chargers/CP-1/auth")
        .body(json!({"presentedSecret": "devsecret"}).to_string())
        .reply(&api)
        .await;
    assert_eq!(allowed.status(), 200);
    assert_eq!(
        body_json(allowed.body()),
        json!({"allowed": true, "ocppVersion": "1.6J"})
    );

    let denied = warp::test::request()
        .method("POST")
        .path("/v1/gateway/chargers/CP-1/auth")
        .body(json!({"presentedSecret": "wrong"}).to_string())
        .reply(&api)
        .await;
    assert_eq!(denied.status(), 401);
    assert_eq!(body_json(denied.body()), json!({"allowed": false}));
}

#[tokio::test]
async fn test_command_dispatch_and_idempotent_replay() {
    let app = create_app(RecordingGateway::acking(r#"{"accepted":true}"#));
    let api = routes(app.clone(), String::new());
    let command = json!({
        "type": "RemoteStartTransaction",
        "chargePointId": "CP-1",
        "idempotencyKey": "idem-1",
        "payload": {"connectorId": 1}
    })
    .to_string();

    let first = warp::test::request()
        .method("POST")
        .path("/v1/commands")
        .body(command.clone())
        .reply(&api)
        .await;
    assert_eq!(first.status(), 200);
    let first_body = body_json(first.body());
    assert_eq!(first_body["status"], "Acked");
    assert_eq!(first_body["gatewayResponse"], json!({"accepted": true}));

    let second = warp::test::request()
        .method("POST")
        .path("/v1/commands")
        .body(command)
        .reply(&api)
        .await;
    assert_eq!(second.status(), 200);
    let second_body = body_json(second.body());
    assert_eq!(second_body["commandId"], first_body["commandId"]);
    assert_eq!(second_body["status"], "Acked");
    assert_eq!(app.gateway.call_count(), 1);
}

#[tokio::test]
async fn test_command_gateway_rejection_maps_to_bad_gateway() {
    let app = create_app(RecordingGateway::replying(GatewayReply {
        status: 503,
        body: r#"{"error":"offline"}"#.to_owned(),
    }));
    let api = routes(app, String::new());

    let response = warp::test::request()
        .method("POST")
        .path("/v1/commands")
        .body(
            json!({"type": "Reset", "chargePointId": "CP-1", "idempotencyKey": "idem-2"})
                .to_string(),
        )
        .reply(&api)
        .await;

    assert_eq!(response.status(), 502);
    let body = body_json(response.body());
    assert_eq!(body["status"], "Failed");
    assert_eq!(body["gatewayStatus"], 503);
    assert_eq!(body["gatewayBody"], json!({"error": "offline"}));
}

#[tokio::test]
async fn test_missing_command_fields_are_rejected() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request()
        .method("POST")
        .path("/v1/commands")
        .body(json!({"type": "Reset"}).to_string())
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_session_read_and_finalize_route() {
    let app = create_app(RecordingGateway::acking("{}"));
    let api = routes(app.clone(), String::new());
    warp::test::request()
        .method("POST")
        .path("/v1/gateway/events")
        .body(
            json!({
                "type": "TransactionStarted", "chargePointId": "CP-1", "connectorId": 1,
                "transactionId": 42, "meterStartWh": 1000, "ts": "2025-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .reply(&api)
        .await;

    let session = app
        .sessions
        .find_by_tx("CP-1", 42)
        .await
        .expect("lookup succeeds")
        .expect("session exists");

    let finalized = warp::test::request()
        .method("POST")
        .path(&format!("/v1/sessions/{}/finalize", session.session_id))
        .reply(&api)
        .await;
    assert_eq!(finalized.status(), 200);
    let body = body_json(finalized.body());
    assert_eq!(body["force"], json!(false));
    assert_eq!(body["session"]["energySource"], "Missing");

    let read = warp::test::request()
        .method("GET")
        .path(&format!("/v1/sessions/{}", session.session_id))
        .reply(&api)
        .await;
    assert_eq!(read.status(), 200);
    assert_eq!(body_json(read.body())["isEstimated"], json!(true));
}

#[tokio::test]
async fn test_settlement_listing_and_marks() {
    let app = create_app(RecordingGateway::acking("{}"));
    seed_priced_charger(&app, "CP-1").await;
    let api = routes(app.clone(), String::new());
    for event in [
        json!({
            "type": "TransactionStarted", "chargePointId": "CP-1", "connectorId": 1,
            "transactionId": 42, "meterStartWh": 1000, "ts": "2025-01-01T00:00:00Z"
        }),
        json!({
            "type": "TransactionEnded", "chargePointId": "CP-1", "transactionId": 42,
            "meterStopWh": 16000, "ts": "2025-01-01T01:00:00Z"
        }),
    ] {
        warp::test::request()
            .method("POST")
            .path("/v1/gateway/events")
            .body(event.to_string())
            .reply(&api)
            .await;
    }

    let listed = warp::test::request()
        .method("GET")
        .path("/v1/settlements?status=Pending")
        .reply(&api)
        .await;
    assert_eq!(listed.status(), 200);
    let body = body_json(listed.body());
    let settlement_id = body["items"][0]["settlementId"].as_str().expect("one settlement").to_owned();
    assert_eq!(body["items"][0]["amount"], "3.7500");

    // Confirming before submission violates the state machine.
    let premature = warp::test::request()
        .method("POST")
        .path(&format!("/v1/settlements/{settlement_id}/confirmed"))
        .reply(&api)
        .await;
    assert_eq!(premature.status(), 409);

    let submitted = warp::test::request()
        .method("POST")
        .path(&format!("/v1/settlements/{settlement_id}/submitted"))
        .body(json!({"chain": "base", "txHash": "0xdead"}).to_string())
        .reply(&api)
        .await;
    assert_eq!(submitted.status(), 204);

    let confirmed = warp::test::request()
        .method("POST")
        .path(&format!("/v1/settlements/{settlement_id}/confirmed"))
        .reply(&api)
        .await;
    assert_eq!(confirmed.status(), 204);
}

#[tokio::test]
async fn test_unknown_charger_is_not_found() {
    let api = routes(create_app(RecordingGateway::acking("{}")), String::new());
    let response = warp::test::request()
        .method("GET")
        .path("/v1/chargers/CP-404")
        .reply(&api)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_site_tariff_and_wallet_routes() {
    let app = create_app(RecordingGateway::acking("{}"));
    let api = routes(app, String::new());

    let created = warp::test::request()
        .method("POST")
        .path("/v1/sites")
        .body(json!({"name": "Depot B"}).to_string())
        .reply(&api)
        .await;
    assert_eq!(created.status(), 200);
    let site_id = body_json(created.body())["siteId"].as_str().expect("site id").to_owned();

    let tariff = warp::test::request()
        .method("POST")
        .path(&format!("/v1/sites/{site_id}/tariffs"))
        .body(json!({"pricePerKwh": 0.25}).to_string())
        .reply(&api)
        .await;
    assert_eq!(tariff.status(), 200);
    let tariff_body = body_json(tariff.body());
    assert_eq!(tariff_body["currency"], "USD");
    assert_eq!(tariff_body["isActive"], json!(true));

    let rejected = warp::test::request()
        .method("POST")
        .path(&format!("/v1/sites/{site_id}/tariffs"))
        .body(json!({"pricePerKwh": 0}).to_string())
        .reply(&api)
        .await;
    assert_eq!(rejected.status(), 400);

    let wallet = warp::test::request()
        .method("PUT")
        .path(&format!("/v1/sites/{site_id}/wallet"))
        .body(json!({"wallet": "0xabc"}).to_string())
        .reply(&api)
        .await;
    assert_eq!(wallet.status(), 204);
}
