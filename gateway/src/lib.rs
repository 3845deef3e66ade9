//! Client for the upstream charger gateway.
//!
//! The management system only ever issues one call: forwarding an operator
//! command. The trait exists so the dispatch path can be exercised without
//! a network; [`RecordingGateway`] is the test double.

use {
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    std::time::Duration,
};

mod recording;

pub use recording::RecordingGateway;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Status and verbatim body of a gateway reply. Transport failures are
/// reported as [`Error::Upstream`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: String,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait GatewayApi: Send + Sync + 'static {
    async fn send_command(&self, body: &serde_json::Value) -> Result<GatewayReply>;
}

/// HTTP implementation posting to `{base_url}/v1/gateway/commands` with a
/// bearer token and a hard 15 s timeout.
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpGatewayClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(Error::upstream)?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http,
        })
    }
}

#[async_trait]
impl GatewayApi for HttpGatewayClient {
    async fn send_command(&self, body: &serde_json::Value) -> Result<GatewayReply> {
        let url = format!("{}/v1/gateway/commands", self.base_url);
        tracing::debug!(%url, "forwarding command to gateway");
        let mut request = self.http.post(&url).json(body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(Error::upstream)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::upstream)?;
        Ok(GatewayReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_reply_success_window() {
        assert!(GatewayReply { status: 200, body: String::new() }.is_success());
        assert!(GatewayReply { status: 299, body: String::new() }.is_success());
        assert!(!GatewayReply { status: 300, body: String::new() }.is_success());
        assert!(!GatewayReply { status: 503, body: String::new() }.is_success());
    }

    #[tokio::test]
    async fn test_recording_gateway_captures_bodies_and_replays_failures() {
        let gateway = RecordingGateway::acking(r#"{"ok":true}"#);
        let reply = gateway.send_command(&json!({"type": "Reset"})).await.expect("scripted ack");
        assert_eq!(reply.status, 200);
        assert_eq!(gateway.sent(), vec![json!({"type": "Reset"})]);

        let unreachable = RecordingGateway::unreachable();
        let error = unreachable.send_command(&json!({})).await.expect_err("scripted failure");
        assert!(matches!(error, Error::Upstream(_)));
        assert_eq!(unreachable.call_count(), 1);
    }
}
