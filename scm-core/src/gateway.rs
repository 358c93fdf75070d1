use async_trait::async_trait;
use serde::Serialize;

/// Result of one outbound message. Failure never aborts the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub reason: Option<String>,
    pub message_id: Option<String>,
}

impl SendOutcome {
    pub fn delivered(message_id: Option<String>) -> Self {
        Self {
            success: true,
            reason: None,
            message_id,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            message_id: None,
        }
    }

    /// Warning text for the operator, if the send failed.
    pub fn warning(&self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(format!(
            "Saved, but the WhatsApp message was not sent: {}",
            self.reason.as_deref().unwrap_or("unknown gateway error")
        ))
    }
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send formatted text to the configured group target.
    async fn send(&self, text: &str) -> SendOutcome;
}

#[async_trait]
pub trait DescriptionEnhancer: Send + Sync {
    /// Rewrite job details for operations. Returns the input on any failure.
    async fn enhance(&self, details: &str) -> String;
}
