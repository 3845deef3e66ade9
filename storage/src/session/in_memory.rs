// Safety: Unwraps allowed here because
// (1) the in-memory backend is only used in tests
// (2) all unwraps come from `RwLock` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{Finalization, NewMeterSample, NewSession, Session, SessionRepository},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    cpms_shared::Result,
    rust_decimal::Decimal,
    serde_json::Value,
    std::sync::{Arc, RwLock},
    uuid::Uuid,
};

#[derive(Debug, Clone)]
struct StoredSample {
    session_id: Uuid,
    ts: DateTime<Utc>,
    samples_json: Value,
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<Vec<Session>>>,
    samples: Arc<RwLock<Vec<StoredSample>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self, session_id: Uuid) -> usize {
        self.samples
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.session_id == session_id)
            .count()
    }
}

/// A meter reading value can arrive as a JSON string or a bare number.
fn reading_value(reading: &Value) -> Option<i64> {
    match &reading["value"] {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

fn matches_measurand(reading: &Value, measurand: &str) -> bool {
    if reading["measurand"].as_str() != Some(measurand) {
        return false;
    }
    match reading["unit"].as_str() {
        None => true,
        Some(unit) => unit == "Wh",
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn start(&self, session: NewSession) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        self.sessions.write().unwrap().push(Session {
            session_id,
            charge_point_id: session.charge_point_id,
            connector_id: session.connector_id,
            transaction_id: session.transaction_id,
            id_tag: session.id_tag,
            started_at: session.started_at,
            ended_at: None,
            meter_start_wh: session.meter_start_wh,
            meter_stop_wh: None,
            reason: None,
            energy_wh: None,
            energy_source: None,
            is_estimated: false,
            finalized_at: None,
            tariff_id: None,
            cost_amount: None,
            cost_currency: None,
        });
        Ok(session_id)
    }

    async fn find_by_tx(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.charge_point_id == charge_point_id && s.transaction_id == transaction_id)
            .max_by_key(|s| s.started_at)
            .cloned())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .unwrap()
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned())
    }

    async fn list_by_charger(&self, charge_point_id: &str, limit: i64) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.charge_point_id == charge_point_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(limit.max(0) as usize);
        Ok(sessions)
    }

    async fn end(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
        meter_stop_wh: Option<i64>,
        reason: Option<String>,
    ) -> Result<()> {
        if let Some(session) = self
            .sessions
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.session_id == session_id)
        {
            session.ended_at = Some(ended_at);
            session.meter_stop_wh = meter_stop_wh.or(session.meter_stop_wh);
            session.reason = reason.or(session.reason.take());
        }
        Ok(())
    }

    async fn insert_meter_sample(&self, sample: NewMeterSample) -> Result<()> {
        self.samples.write().unwrap().push(StoredSample {
            session_id: sample.session_id,
            ts: sample.ts,
            samples_json: sample.samples_json,
        });
        Ok(())
    }

    async fn last_register_wh(&self, session_id: Uuid) -> Result<Option<i64>> {
        let samples = self.samples.read().unwrap();
        let mut candidates: Vec<(DateTime<Utc>, i64)> = samples
            .iter()
            .filter(|s| s.session_id == session_id)
            .flat_map(|s| {
                let readings = s.samples_json["samples"].as_array().cloned().unwrap_or_default();
                readings
                    .into_iter()
                    .filter(|r| matches_measurand(r, "Energy.Active.Import.Register"))
                    .filter_map(|r| reading_value(&r))
                    .map(move |v| (s.ts, v))
                    .collect::<Vec<_>>()
            })
            .collect();
        candidates.sort_by_key(|(ts, _)| *ts);
        Ok(candidates.last().map(|(_, v)| *v))
    }

    async fn interval_sum_wh(&self, session_id: Uuid) -> Result<i64> {
        let samples = self.samples.read().unwrap();
        let sum = samples
            .iter()
            .filter(|s| s.session_id == session_id)
            .flat_map(|s| s.samples_json["samples"].as_array().cloned().unwrap_or_default())
            .filter(|r| matches_measurand(r, "Energy.Active.Import.Interval"))
            .filter_map(|r| reading_value(&r))
            .sum();
        Ok(sum)
    }

    async fn finalize(&self, session_id: Uuid, outcome: &Finalization) -> Result<()> {
        if let Some(session) = self
            .sessions
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.session_id == session_id)
        {
            if session.meter_stop_wh.is_none() {
                session.meter_stop_wh = outcome.backfill_meter_stop_wh;
            }
            session.energy_wh = outcome.energy_wh;
            session.energy_source = Some(outcome.source.as_str().to_owned());
            session.is_estimated = outcome.is_estimated;
            session.finalized_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_pricing(
        &self,
        session_id: Uuid,
        tariff_id: Uuid,
        cost_amount: Decimal,
        cost_currency: &str,
    ) -> Result<()> {
        if let Some(session) = self
            .sessions
            .write()
            .unwrap()
            .iter_mut()
            .find(|s| s.session_id == session_id)
        {
            session.tariff_id = Some(tariff_id);
            session.cost_amount = Some(cost_amount);
            session.cost_currency = Some(cost_currency.to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone, serde_json::json};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, minute, 0).unwrap()
    }

    async fn repo_with_samples(samples: Vec<(DateTime<Utc>, Value)>) -> (InMemorySessionRepository, Uuid) {
        let repo = InMemorySessionRepository::new();
        let session_id = repo
            .start(NewSession {
                charge_point_id: "CP-1".to_owned(),
                connector_id: 1,
                transaction_id: 42,
                id_tag: String::new(),
                started_at: ts(0),
                meter_start_wh: Some(1000),
            })
            .await
            .unwrap();
        for (at, samples_json) in samples {
            repo.insert_meter_sample(NewMeterSample {
                session_id,
                charge_point_id: "CP-1".to_owned(),
                transaction_id: 42,
                ts: at,
                samples_json,
            })
            .await
            .unwrap();
        }
        (repo, session_id)
    }

    #[tokio::test]
    async fn test_last_register_takes_the_greatest_sample_timestamp() {
        let (repo, session_id) = repo_with_samples(vec![
            (
                ts(25),
                json!({"samples": [{"measurand": "Energy.Active.Import.Register", "value": "3200", "unit": "Wh"}]}),
            ),
            (
                ts(10),
                json!({"samples": [{"measurand": "Energy.Active.Import.Register", "value": "2500", "unit": "Wh"}]}),
            ),
        ])
        .await;

        assert_eq!(repo.last_register_wh(session_id).await.unwrap(), Some(3200));
    }

    #[tokio::test]
    async fn test_register_accepts_numeric_values_and_absent_units() {
        let (repo, session_id) = repo_with_samples(vec![(
            ts(10),
            json!({"samples": [{"measurand": "Energy.Active.Import.Register", "value": 2750}]}),
        )])
        .await;

        assert_eq!(repo.last_register_wh(session_id).await.unwrap(), Some(2750));
    }

    #[tokio::test]
    async fn test_register_ignores_foreign_units_and_measurands() {
        let (repo, session_id) = repo_with_samples(vec![(
            ts(10),
            json!({"samples": [
                {"measurand": "Energy.Active.Import.Register", "value": "2", "unit": "kWh"},
                {"measurand": "Power.Active.Import", "value": "7000", "unit": "W"}
            ]}),
        )])
        .await;

        assert_eq!(repo.last_register_wh(session_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_interval_sum_only_counts_interval_readings() {
        let (repo, session_id) = repo_with_samples(vec![(
            ts(15),
            json!({"samples": [
                {"measurand": "Energy.Active.Import.Interval", "value": "500", "unit": "Wh"},
                {"measurand": "Energy.Active.Import.Interval", "value": "300"},
                {"measurand": "Energy.Active.Import.Register", "value": "9999", "unit": "Wh"}
            ]}),
        )])
        .await;

        assert_eq!(repo.interval_sum_wh(session_id).await.unwrap(), 800);
    }

    #[tokio::test]
    async fn test_find_by_tx_prefers_the_latest_start() {
        let repo = InMemorySessionRepository::new();
        for (minute, start) in [(0, 100), (1, 200)] {
            repo.start(NewSession {
                charge_point_id: "CP-1".to_owned(),
                connector_id: 1,
                transaction_id: 42,
                id_tag: String::new(),
                started_at: ts(minute),
                meter_start_wh: Some(start),
            })
            .await
            .unwrap();
        }

        let session = repo.find_by_tx("CP-1", 42).await.unwrap().unwrap();
        assert_eq!(session.meter_start_wh, Some(200));
    }
}

