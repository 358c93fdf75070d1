use async_trait::async_trait;
use scm_core::gateway::{MessageGateway, SendOutcome};
use tokio::sync::Mutex;

/// Gateway that records every message instead of sending it, optionally
/// answering every send with a fixed failure.
#[derive(Default)]
pub struct ScriptedGateway {
    sent: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(reason.to_string())),
        }
    }

    pub async fn set_failure(&self, reason: Option<&str>) {
        *self.failure.lock().await = reason.map(str::to_string);
    }

    /// Messages attempted so far, in order, including failed ones.
    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageGateway for ScriptedGateway {
    async fn send(&self, text: &str) -> SendOutcome {
        let mut sent = self.sent.lock().await;
        sent.push(text.to_string());
        match self.failure.lock().await.as_ref() {
            Some(reason) => SendOutcome::failed(reason.clone()),
            None => SendOutcome::delivered(Some(format!("scripted-{}", sent.len()))),
        }
    }
}
