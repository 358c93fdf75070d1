use axum::{extract::State, http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod chat;
pub mod error;
pub mod settings;
pub mod state;
pub mod stream;
pub mod summary_handler;

pub use state::AppState;

use crate::error::AppError;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(bookings::routes())
        .merge(chat::routes())
        .merge(summary_handler::routes())
        .merge(stream::routes())
        .merge(settings::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.dispatch.ping_store().await?;
    Ok(Json(json!({ "status": "ok", "store": state.store_kind })))
}
