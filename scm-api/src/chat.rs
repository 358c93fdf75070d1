use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use scm_dispatch::Outcome;
use scm_shared::Notification;
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/notifications", get(list_notifications))
        .route("/v1/chat", post(post_message))
}

async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.dispatch.notifications().await)
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

async fn post_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Outcome<Vec<Notification>>>, AppError> {
    Ok(Json(state.dispatch.handle_chat(&req.message).await?))
}
