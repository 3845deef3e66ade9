//! Request and response shapes of the HTTP surface.

use {
    chrono::{DateTime, Utc},
    cpms_storage::{Charger, ConnectorState, Session, Settlement},
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthRequest {
    pub presented_secret: String,
    pub remote_addr: Option<String>,
    pub cert_fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocpp_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandBody {
    #[serde(rename = "type")]
    pub command_type: String,
    pub charge_point_id: String,
    pub idempotency_key: String,
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSiteBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TariffBody {
    pub price_per_kwh: Decimal,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletBody {
    #[serde(default)]
    pub wallet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkSubmittedBody {
    pub chain: String,
    pub tx_hash: String,
    pub external_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkFailedBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinalizeQuery {
    pub force: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerResponse {
    pub charge_point_id: String,
    pub is_active: bool,
    pub vendor: String,
    pub model: String,
    pub ocpp_version: String,
    pub site_id: Option<Uuid>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Charger> for ChargerResponse {
    fn from(charger: Charger) -> Self {
        Self {
            charge_point_id: charger.charge_point_id,
            is_active: charger.is_active,
            vendor: charger.vendor,
            model: charger.model,
            ocpp_version: charger.ocpp_version,
            site_id: charger.site_id,
            last_seen_at: charger.last_seen_at,
            created_at: charger.created_at,
            updated_at: charger.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorResponse {
    pub charge_point_id: String,
    pub connector_id: i32,
    pub status: String,
    pub error_code: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ConnectorState> for ConnectorResponse {
    fn from(state: ConnectorState) -> Self {
        Self {
            charge_point_id: state.charge_point_id,
            connector_id: state.connector_id,
            status: state.status,
            error_code: state.error_code,
            updated_at: state.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub charge_point_id: String,
    pub connector_id: i32,
    pub transaction_id: i32,
    pub id_tag: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub meter_start_wh: Option<i64>,
    pub meter_stop_wh: Option<i64>,
    pub reason: Option<String>,
    pub energy_wh: Option<i64>,
    pub energy_source: Option<String>,
    pub is_estimated: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub tariff_id: Option<Uuid>,
    pub cost_amount: Option<Decimal>,
    pub cost_currency: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            charge_point_id: session.charge_point_id,
            connector_id: session.connector_id,
            transaction_id: session.transaction_id,
            id_tag: session.id_tag,
            started_at: session.started_at,
            ended_at: session.ended_at,
            meter_start_wh: session.meter_start_wh,
            meter_stop_wh: session.meter_stop_wh,
            reason: session.reason,
            energy_wh: session.energy_wh,
            energy_source: session.energy_source,
            is_estimated: session.is_estimated,
            finalized_at: session.finalized_at,
            tariff_id: session.tariff_id,
            cost_amount: session.cost_amount,
            cost_currency: session.cost_currency,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub settlement_id: Uuid,
    pub session_id: Uuid,
    pub site_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub chain: Option<String>,
    pub tx_hash: Option<String>,
    pub external_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Settlement> for SettlementResponse {
    fn from(settlement: Settlement) -> Self {
        Self {
            settlement_id: settlement.settlement_id,
            session_id: settlement.session_id,
            site_id: settlement.site_id,
            amount: settlement.amount,
            currency: settlement.currency,
            status: settlement.status,
            chain: settlement.chain,
            tx_hash: settlement.tx_hash,
            external_ref: settlement.external_ref,
            error: settlement.error,
            created_at: settlement.created_at,
            updated_at: settlement.updated_at,
        }
    }
}
