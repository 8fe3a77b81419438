//! Payment gateway surface: inbound settlement webhook, transaction
//! creation, read-only status checks, and the method catalog.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::use_cases::reconciliation::{
        ReconcileOutcome, SettlementEvent, StatusCheck, TransactionInitiation,
    },
    domain::entities::gateway_method::GatewayMethod,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(settlement_webhook))
        .route("/invoices/{id}/transaction", post(create_transaction))
        .route("/invoices/{id}/status", get(check_status))
        .route("/methods", get(list_methods))
}

/// POST /api/gateway/webhook
///
/// Acknowledgment contract: 200 with `processed: false` for events we accept
/// but do not act on (interim status, replayed delivery), 200 with
/// `processed: true` for settlements, 4xx for validation rejections so the
/// provider's retry policy stops. 5xx only for genuine internal faults.
async fn settlement_webhook(
    State(app_state): State<AppState>,
    Json(event): Json<SettlementEvent>,
) -> AppResult<Json<serde_json::Value>> {
    tracing::info!(
        order_id = %event.order_id,
        status = %event.status,
        "Gateway webhook received"
    );

    let outcome = app_state.reconciliation_use_cases.reconcile(&event).await?;

    let body = match outcome {
        ReconcileOutcome::Settled {
            invoice_id,
            tenant_id,
            tenant_reactivated,
        } => json!({
            "received": true,
            "processed": true,
            "invoice_id": invoice_id,
            "tenant_id": tenant_id,
            "tenant_reactivated": tenant_reactivated,
        }),
        ReconcileOutcome::Ignored { reason } => json!({
            "received": true,
            "processed": false,
            "reason": reason.as_str(),
        }),
    };

    Ok(Json(body))
}

#[derive(Deserialize)]
struct CreateTransactionRequest {
    #[serde(default = "default_method")]
    method: GatewayMethod,
}

fn default_method() -> GatewayMethod {
    GatewayMethod::Qris
}

/// POST /api/gateway/invoices/{id}/transaction
async fn create_transaction(
    State(app_state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(body): Json<CreateTransactionRequest>,
) -> AppResult<Json<TransactionInitiation>> {
    let initiation = app_state
        .reconciliation_use_cases
        .create_transaction(invoice_id, body.method)
        .await?;
    Ok(Json(initiation))
}

/// GET /api/gateway/invoices/{id}/status
async fn check_status(
    State(app_state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<StatusCheck>> {
    let check = app_state
        .reconciliation_use_cases
        .check_status(invoice_id)
        .await?;
    Ok(Json(check))
}

/// GET /api/gateway/methods
async fn list_methods() -> Json<serde_json::Value> {
    let methods: Vec<serde_json::Value> = GatewayMethod::ALL
        .iter()
        .map(|m| {
            json!({
                "id": m.as_str(),
                "name": m.display_name(),
                "description": m.description(),
            })
        })
        .collect();

    Json(json!({ "methods": methods }))
}
