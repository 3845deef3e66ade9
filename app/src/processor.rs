//! The event processor: one raw envelope in, idempotent state mutation out.
//!
//! Policy: the raw event is persisted to the audit log first; from then on
//! every handler failure is logged and discarded so the audit trail stays
//! complete even when state mutation fails transiently. Only envelope
//! errors and an audit insert failure surface to the caller.

use {
    crate::{Application, Dependencies, envelope::Envelope},
    chrono::Utc,
    cpms_shared::Result,
    cpms_storage::{
        ChargerRepository, ConnectorState, ConnectorStateRepository, EventRepository, NewCharger,
        NewMeterSample, NewSession, SessionRepository,
    },
};

/// Explicitly discards a post-audit failure, keeping the ingest path alive.
fn discard<T>(operation: &str, result: Result<T>) {
    if let Err(error) = result {
        tracing::warn!(%error, operation, "state mutation failed after audit persist");
    }
}

impl<D: Dependencies> Application<D> {
    /// Consumes one opaque event body and returns the detected type.
    pub async fn ingest(&self, raw: &[u8]) -> Result<String> {
        let envelope = Envelope::decode(raw, self.max_event_skew, Utc::now())?;

        self.events
            .insert_raw(&envelope.charge_point_id, &envelope.event_type, envelope.ts, &envelope.body)
            .await?;

        match envelope.event_type.as_str() {
            "ChargerBooted" => self.on_charger_booted(&envelope).await,
            "ChargerHeartbeat" => {
                discard(
                    "touch last_seen",
                    self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
                );
            }
            "ConnectorStatusChanged" => self.on_connector_status(&envelope).await,
            "TransactionStarted" => self.on_transaction_started(&envelope).await,
            "MeterSample" => self.on_meter_sample(&envelope).await,
            "TransactionEnded" => self.on_transaction_ended(&envelope).await,
            unknown => {
                tracing::debug!(event_type = unknown, "unknown event type kept in audit log only");
            }
        }

        Ok(envelope.event_type)
    }

    async fn on_charger_booted(&self, envelope: &Envelope) {
        match self.chargers.get(&envelope.charge_point_id).await {
            Ok(Some(_)) => discard(
                "touch last_seen",
                self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
            ),
            // First sight of this charger: register it inactive with no
            // secret; activation happens through the operator seed path.
            Ok(None) => discard(
                "register booted charger",
                self.chargers
                    .insert_if_absent(NewCharger {
                        charge_point_id: envelope.charge_point_id.clone(),
                        secret_hash: String::new(),
                        is_active: false,
                        vendor: envelope.str_field("vendor").unwrap_or_default().to_owned(),
                        model: envelope.str_field("model").unwrap_or_default().to_owned(),
                        ocpp_version: envelope.str_field("ocppVersion").unwrap_or_default().to_owned(),
                    })
                    .await,
            ),
            Err(error) => {
                tracing::warn!(%error, "charger lookup failed after audit persist");
            }
        }
    }

    async fn on_connector_status(&self, envelope: &Envelope) {
        discard(
            "upsert connector state",
            self.connectors
                .upsert(ConnectorState {
                    charge_point_id: envelope.charge_point_id.clone(),
                    connector_id: envelope.int_field("connectorId"),
                    status: envelope.str_field("status").unwrap_or_default().to_owned(),
                    error_code: envelope.str_field("errorCode").unwrap_or_default().to_owned(),
                    updated_at: envelope.ts,
                })
                .await,
        );
        discard(
            "touch last_seen",
            self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
        );
    }

    async fn on_transaction_started(&self, envelope: &Envelope) {
        discard(
            "start session",
            self.sessions
                .start(NewSession {
                    charge_point_id: envelope.charge_point_id.clone(),
                    connector_id: envelope.int_field("connectorId"),
                    transaction_id: envelope.int_field("transactionId"),
                    id_tag: envelope.str_field("idTag").unwrap_or_default().to_owned(),
                    started_at: envelope.ts,
                    meter_start_wh: envelope.int64_field("meterStartWh"),
                })
                .await,
        );
        discard(
            "touch last_seen",
            self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
        );
    }

    async fn on_meter_sample(&self, envelope: &Envelope) {
        let transaction_id = envelope.int_field("transactionId");
        let session = match self.sessions.find_by_tx(&envelope.charge_point_id, transaction_id).await
        {
            Ok(Some(session)) => session,
            // The session may not have started yet; the audit record is
            // already persisted, so the sample is dropped silently.
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(%error, "session lookup failed after audit persist");
                return;
            }
        };
        discard(
            "append meter sample",
            self.sessions
                .insert_meter_sample(NewMeterSample {
                    session_id: session.session_id,
                    charge_point_id: envelope.charge_point_id.clone(),
                    transaction_id,
                    ts: envelope.ts,
                    samples_json: envelope.body.clone(),
                })
                .await,
        );
        discard(
            "touch last_seen",
            self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
        );
    }

    async fn on_transaction_ended(&self, envelope: &Envelope) {
        let transaction_id = envelope.int_field("transactionId");
        let session = match self.sessions.find_by_tx(&envelope.charge_point_id, transaction_id).await
        {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(%error, "session lookup failed after audit persist");
                return;
            }
        };

        discard(
            "record session end markers",
            self.sessions
                .end(
                    session.session_id,
                    envelope.ts,
                    envelope.int64_field("meterStopWh"),
                    envelope.str_field("reason").map(str::to_owned),
                )
                .await,
        );
        // The post-end pipeline runs synchronously so a caller observing the
        // 202 can immediately read a finalized and priced session. Each step
        // is idempotent.
        discard("finalize session", self.finalize_with_fallback(session.session_id).await);
        discard("price session", self.price_session_per_kwh(session.session_id).await);
        discard(
            "create pending settlement",
            self.create_pending_from_session(session.session_id).await,
        );
        discard(
            "touch last_seen",
            self.chargers.touch_last_seen(&envelope.charge_point_id, envelope.ts).await,
        );
    }
}
