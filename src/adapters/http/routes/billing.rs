//! Manual triggers for the timer-driven sweeps.
//!
//! These share the exact code paths with the scheduler, so a manual run
//! overlapping a scheduled one is safe by the same idempotency guarantees.

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::use_cases::{billing_period::BillingPeriod, invoice_generation::GenerationSummary},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_invoices))
        .route("/reminders/run", post(run_reminders))
        .route("/enforcement/run", post(run_enforcement))
}

#[derive(Deserialize)]
struct GenerateRequest {
    month: u32,
    year: i32,
}

/// POST /api/billing/generate
async fn generate_invoices(
    State(app_state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> AppResult<Json<GenerationSummary>> {
    let period = BillingPeriod::new(body.month, body.year)?;
    let summary = app_state
        .generation_use_cases
        .generate_for_period(period)
        .await?;
    Ok(Json(summary))
}

/// POST /api/billing/reminders/run
async fn run_reminders(State(app_state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    app_state
        .reminder_use_cases
        .run_reminders(Utc::now().date_naive())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/billing/enforcement/run
async fn run_enforcement(State(app_state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    app_state
        .enforcement_use_cases
        .run_enforcement(Utc::now().date_naive())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
