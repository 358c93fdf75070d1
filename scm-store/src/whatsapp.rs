//! Fonnte WhatsApp gateway client.

use async_trait::async_trait;
use reqwest::Client;
use scm_core::gateway::{MessageGateway, SendOutcome};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::app_config::MessagingConfig;

/// Messaging settings shared between the gateway and the settings endpoints.
pub type SharedMessaging = Arc<RwLock<MessagingConfig>>;

#[derive(Clone)]
pub struct FonnteClient {
    client: Client,
    config: SharedMessaging,
}

#[derive(Debug, Deserialize)]
struct FonnteResponse {
    status: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    id: Option<Value>,
}

impl FonnteResponse {
    fn into_outcome(self) -> SendOutcome {
        if !self.status {
            return SendOutcome::failed(
                self.reason
                    .unwrap_or_else(|| "Rejected by gateway (check device status)".to_string()),
            );
        }
        let message_id = match self.id {
            Some(Value::Array(ids)) => ids.into_iter().next().map(|id| value_to_string(&id)),
            Some(other) => Some(value_to_string(&other)),
            None => None,
        };
        SendOutcome::delivered(message_id)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FonnteClient {
    pub fn new(config: SharedMessaging) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn settings(&self) -> SharedMessaging {
        self.config.clone()
    }
}

#[async_trait]
impl MessageGateway for FonnteClient {
    async fn send(&self, text: &str) -> SendOutcome {
        let config = self.config.read().await.clone();
        if !config.is_configured() {
            return SendOutcome::failed("Messaging token/target not configured");
        }

        let form = [
            ("target", config.target.trim()),
            ("message", text),
            ("countryCode", config.country_code.as_str()),
        ];

        let response = match self
            .client
            .post(&config.endpoint)
            .header("Authorization", config.token.trim())
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Messaging gateway unreachable: {}", e);
                return SendOutcome::failed(format!("Gateway unreachable: {}", e));
            }
        };

        let status = response.status();
        let outcome = match response.json::<FonnteResponse>().await {
            Ok(body) => body.into_outcome(),
            Err(e) => SendOutcome::failed(format!("Unexpected gateway response ({}): {}", status, e)),
        };

        if outcome.success {
            info!("WhatsApp message sent: {:?}", outcome.message_id);
        } else {
            warn!("WhatsApp message rejected: {:?}", outcome.reason);
        }
        outcome
    }
}
