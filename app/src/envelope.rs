//! Decoding of the common event envelope.
//!
//! Events are heterogeneous; only `type`, `chargePointId` and `ts` are
//! shared. The body is kept as a raw [`Value`] so handlers can pull their
//! type-specific fields and the audit row can persist the envelope
//! verbatim.

use {
    chrono::{DateTime, TimeDelta, Utc},
    cpms_shared::{Error, Result},
    serde_json::Value,
    std::time::Duration,
};

#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub event_type: String,
    pub charge_point_id: String,
    pub ts: DateTime<Utc>,
    pub body: Value,
}

impl Envelope {
    pub fn decode(raw: &[u8], max_skew: Duration, now: DateTime<Utc>) -> Result<Self> {
        let body: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::invalid_input(format!("undecodable event: {e}")))?;

        let event_type = body["type"].as_str().unwrap_or_default().to_owned();
        if event_type.is_empty() {
            return Err(Error::invalid_input("missing type"));
        }
        let charge_point_id = body["chargePointId"].as_str().unwrap_or_default().to_owned();
        if charge_point_id.is_empty() {
            return Err(Error::invalid_input("missing chargePointId"));
        }

        let ts = normalize_ts(body["ts"].as_str(), max_skew, now);
        Ok(Self { event_type, charge_point_id, ts, body })
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body[key].as_str()
    }

    pub fn int_field(&self, key: &str) -> i32 {
        int64_from(&self.body[key]).unwrap_or_default() as i32
    }

    pub fn int64_field(&self, key: &str) -> Option<i64> {
        int64_from(&self.body[key])
    }
}

/// Missing or unparsable timestamps become `now`; parsable ones outside the
/// configured skew window are clamped to `now` and the event is kept.
fn normalize_ts(raw: Option<&str>, max_skew: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(ts) = raw
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
    else {
        return now;
    };
    if max_skew.is_zero() {
        return ts;
    }
    let skew = TimeDelta::from_std(max_skew).unwrap_or(TimeDelta::MAX);
    if ts < now - skew || ts > now + skew {
        return now;
    }
    ts
}

/// Integer fields can be surfaced by the parser as either integer or
/// floating-point numbers.
fn int64_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            number.as_i64().or_else(|| number.as_f64().map(|f| f as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    fn now() -> DateTime<Utc> {
        "2025-01-01T12:00:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn test_decode_extracts_envelope_fields() {
        let raw = br#"{"type":"ChargerHeartbeat","chargePointId":"CP-1","ts":"2025-01-01T11:59:00Z"}"#;
        let envelope = Envelope::decode(raw, Duration::ZERO, now()).expect("decodes");
        assert_eq!(envelope.event_type, "ChargerHeartbeat");
        assert_eq!(envelope.charge_point_id, "CP-1");
        assert_eq!(envelope.ts, "2025-01-01T11:59:00Z".parse::<DateTime<Utc>>().expect("ts"));
    }

    #[test_case(br#"not json"# ; "undecodable body")]
    #[test_case(br#"{"chargePointId":"CP-1"}"# ; "missing type")]
    #[test_case(br#"{"type":"ChargerHeartbeat"}"# ; "missing charge point id")]
    fn test_decode_rejects_bad_envelopes(raw: &[u8]) {
        assert!(matches!(
            Envelope::decode(raw, Duration::ZERO, now()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_ts_defaults_to_now() {
        let raw = br#"{"type":"ChargerHeartbeat","chargePointId":"CP-1"}"#;
        let envelope = Envelope::decode(raw, Duration::ZERO, now()).expect("decodes");
        assert_eq!(envelope.ts, now());
    }

    #[test]
    fn test_ts_outside_skew_window_is_clamped_to_now() {
        let raw = br#"{"type":"ChargerHeartbeat","chargePointId":"CP-1","ts":"2025-01-01T13:00:00Z"}"#;
        let envelope =
            Envelope::decode(raw, Duration::from_secs(5 * 60), now()).expect("decodes");
        assert_eq!(envelope.ts, now());
    }

    #[test]
    fn test_ts_inside_skew_window_is_kept() {
        let raw = br#"{"type":"ChargerHeartbeat","chargePointId":"CP-1","ts":"2025-01-01T11:58:00Z"}"#;
        let envelope =
            Envelope::decode(raw, Duration::from_secs(5 * 60), now()).expect("decodes");
        assert_eq!(envelope.ts, "2025-01-01T11:58:00Z".parse::<DateTime<Utc>>().expect("ts"));
    }

    #[test_case(r#"{"meterStartWh":1000}"#, Some(1000) ; "integer representation")]
    #[test_case(r#"{"meterStartWh":1000.0}"#, Some(1000) ; "floating point representation")]
    #[test_case(r#"{"meterStartWh":"1000"}"#, None ; "strings are not numbers")]
    #[test_case(r#"{}"#, None ; "absent field")]
    fn test_int64_field_coercion(body: &str, expected: Option<i64>) {
        let raw = format!(
            r#"{{"type":"T","chargePointId":"CP-1","meterStartWh":{}}}"#,
            serde_json::from_str::<Value>(body).expect("valid json")["meterStartWh"]
        );
        let envelope = Envelope::decode(raw.as_bytes(), Duration::ZERO, now()).expect("decodes");
        assert_eq!(envelope.int64_field("meterStartWh"), expected);
    }
}
