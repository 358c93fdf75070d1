use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use scm_core::gateway::SendOutcome;
use scm_shared::Masked;
use scm_store::app_config::MessagingConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/settings", get(get_settings))
        .route("/v1/settings/messaging", put(update_messaging))
        .route("/v1/settings/messaging/test", post(test_messaging))
        .route("/v1/settings/database/test", post(test_database))
}

#[derive(Debug, Serialize)]
struct MessagingView {
    endpoint: String,
    token: Masked<String>,
    target: String,
    country_code: String,
    configured: bool,
}

impl From<MessagingConfig> for MessagingView {
    fn from(config: MessagingConfig) -> Self {
        Self {
            configured: config.is_configured(),
            endpoint: config.endpoint,
            token: Masked::from(config.token),
            target: config.target,
            country_code: config.country_code,
        }
    }
}

#[derive(Debug, Serialize)]
struct SettingsView {
    store: &'static str,
    messaging: MessagingView,
    id_prefix: String,
}

async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let messaging = state.messaging.read().await.clone();
    Json(SettingsView {
        store: state.store_kind,
        messaging: messaging.into(),
        id_prefix: state.dispatch.ids().prefix().to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct MessagingUpdate {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    target: Option<String>,
}

async fn update_messaging(
    State(state): State<AppState>,
    Json(update): Json<MessagingUpdate>,
) -> Result<Json<MessagingView>, AppError> {
    let token = update.token.map(|t| t.trim().to_string());
    let target = update.target.map(|t| t.trim().to_string());

    if let Some(token) = &token {
        state.settings.save_setting(MessagingConfig::TOKEN_KEY, token).await?;
    }
    if let Some(target) = &target {
        state.settings.save_setting(MessagingConfig::TARGET_KEY, target).await?;
    }

    let mut messaging = state.messaging.write().await;
    if let Some(token) = token {
        messaging.token = token;
    }
    if let Some(target) = target {
        messaging.target = target;
    }
    info!("Messaging settings updated (target: {})", messaging.target);
    Ok(Json(messaging.clone().into()))
}

async fn test_messaging(State(state): State<AppState>) -> Json<SendOutcome> {
    Json(state.dispatch.test_gateway().await)
}

#[derive(Debug, Serialize)]
struct ConnectionCheck {
    success: bool,
    message: String,
}

async fn test_database(State(state): State<AppState>) -> Result<Json<ConnectionCheck>, AppError> {
    state.dispatch.ping_store().await?;
    Ok(Json(ConnectionCheck {
        success: true,
        message: format!("Connected to the {} store", state.store_kind),
    }))
}
