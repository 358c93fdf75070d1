use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use scm_core::schedule::{DaySchedule, StatusCount};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/dashboard", get(dashboard))
        .route("/v1/schedule", get(schedule))
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    total: usize,
    counts: Vec<StatusCount>,
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let counts = state.dispatch.dashboard().await;
    Json(DashboardResponse {
        total: counts.iter().map(|c| c.count).sum(),
        counts,
    })
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    date: Option<String>,
}

async fn schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<DaySchedule>, AppError> {
    let date = match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))?,
        None => Local::now().date_naive(),
    };
    Ok(Json(state.dispatch.schedule(date).await))
}
