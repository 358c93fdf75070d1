use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use scm_dispatch::Outcome;
use scm_shared::{BookingForm, BookingRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/enhance", post(enhance_details))
        .route("/v1/bookings/refresh", post(refresh))
        .route(
            "/v1/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/v1/bookings/{id}/status", put(set_status))
}

async fn list_bookings(State(state): State<AppState>) -> Json<Vec<BookingRequest>> {
    Json(state.dispatch.bookings().await)
}

async fn create_booking(
    State(state): State<AppState>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<Outcome<BookingRequest>>), AppError> {
    let outcome = state.dispatch.create_booking(&form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingRequest>, AppError> {
    Ok(Json(state.dispatch.booking(&id).await?))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<BookingForm>,
) -> Result<Json<Outcome<BookingRequest>>, AppError> {
    Ok(Json(state.dispatch.update_booking(&id, &form).await?))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Outcome<BookingRequest>>, AppError> {
    Ok(Json(state.dispatch.delete_booking(&id).await?))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Outcome<BookingRequest>>, AppError> {
    Ok(Json(state.dispatch.set_status(&id, &req.status).await?))
}

#[derive(Debug, Deserialize, Serialize)]
struct EnhanceBody {
    details: String,
}

async fn enhance_details(
    State(state): State<AppState>,
    Json(req): Json<EnhanceBody>,
) -> Result<Json<EnhanceBody>, AppError> {
    if req.details.trim().is_empty() {
        return Err(AppError::ValidationError("Job details are required".to_string()));
    }
    let details = state.enhancer.enhance(&req.details).await;
    Ok(Json(EnhanceBody { details }))
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    bookings: usize,
    notifications: usize,
}

async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    state.dispatch.refresh().await?;
    let response = RefreshResponse {
        bookings: state.dispatch.bookings().await.len(),
        notifications: state.dispatch.notifications().await.len(),
    };
    info!("Manual refresh: {} bookings", response.bookings);
    Ok(Json(response))
}
