// Safety: Unwraps allowed here because
// (1) the recording gateway is only used in tests
// (2) all unwraps come from `Mutex` poisoning, which should never happen
// if the rest of the code does not panic.
#![allow(clippy::unwrap_used)]

use {
    super::{GatewayApi, GatewayReply},
    async_trait::async_trait,
    cpms_shared::{Error, Result},
    std::sync::{Arc, Mutex},
};

/// Test double that records every forwarded body and replays a scripted
/// reply.
#[derive(Debug, Clone)]
pub struct RecordingGateway {
    reply: Arc<Mutex<Result<GatewayReply>>>,
    sent: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl RecordingGateway {
    /// Replies 200 with the given body.
    pub fn acking(body: &str) -> Self {
        Self::replying(GatewayReply { status: 200, body: body.to_owned() })
    }

    pub fn replying(reply: GatewayReply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Ok(reply))),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every send with a transport error.
    pub fn unreachable() -> Self {
        Self {
            reply: Arc::new(Mutex::new(Err(Error::upstream("connection refused")))),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl GatewayApi for RecordingGateway {
    async fn send_command(&self, body: &serde_json::Value) -> Result<GatewayReply> {
        self.sent.lock().unwrap().push(body.clone());
        match &*self.reply.lock().unwrap() {
            Ok(reply) => Ok(reply.clone()),
            Err(Error::Upstream(message)) => Err(Error::Upstream(message.clone())),
            Err(_) => Err(Error::upstream("unexpected scripted failure")),
        }
    }
}
