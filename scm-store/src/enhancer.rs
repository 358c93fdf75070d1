//! Optional rewrite of job details through a text-generation API.

use async_trait::async_trait;
use reqwest::Client;
use scm_core::gateway::DescriptionEnhancer;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::app_config::EnhancerConfig;

pub struct GeminiEnhancer {
    client: Client,
    config: EnhancerConfig,
}

impl GeminiEnhancer {
    pub fn new(config: EnhancerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn prompt(details: &str) -> String {
        format!(
            "You are an expert SCM logistics coordinator. Enhance the following heavy transport job details \
             to be more professional and technically clear for operations. Keep it concise. \
             Original details: \"{}\"",
            details
        )
    }

    async fn generate(&self, details: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!(
            "{}/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(details) }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 200 }
        });

        let response: Value = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(extract_text(&response))
    }
}

fn extract_text(response: &Value) -> Option<String> {
    let text = response["candidates"][0]["content"]["parts"][0]["text"].as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl DescriptionEnhancer for GeminiEnhancer {
    async fn enhance(&self, details: &str) -> String {
        if self.config.api_key.trim().is_empty() || details.trim().is_empty() {
            debug!("Enhancer not configured, returning details unchanged");
            return details.to_string();
        }

        match self.generate(details).await {
            Ok(Some(text)) => text,
            Ok(None) => details.to_string(),
            Err(e) => {
                warn!("Enhancer failed: {}", e);
                details.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  Lift 20t transformer at Bay 3.  " }] } }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("Lift 20t transformer at Bay 3."));
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
    }

    #[tokio::test]
    async fn test_without_key_returns_input() {
        let enhancer = GeminiEnhancer::new(EnhancerConfig::default());
        assert_eq!(enhancer.enhance("move crane").await, "move crane");
    }
}
