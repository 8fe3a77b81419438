use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    app_error::AppResult, application::use_cases::ledger::GatewayCredentials,
    domain::entities::gateway_method::GatewayMethod,
};

/// A freshly created provider transaction.
#[derive(Debug, Clone)]
pub struct GatewayTransaction {
    /// Provider payment reference. For QR methods this is the scannable
    /// payload string.
    pub payment_number: Option<String>,
    /// Total the provider expects, fees included.
    pub total_amount: Option<i64>,
    pub expires_at: Option<NaiveDateTime>,
}

/// Raw provider-side status of an existing transaction.
#[derive(Debug, Clone)]
pub struct GatewayTransactionStatus {
    pub status: String,
}

/// Payment gateway port. Both calls are on the critical path: failures are
/// surfaced as `AppError::Upstream` to the immediate caller, and no local
/// state is mutated until the provider response is known.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_transaction(
        &self,
        credentials: &GatewayCredentials,
        method: GatewayMethod,
        order_id: &str,
        amount: i64,
    ) -> AppResult<GatewayTransaction>;

    async fn transaction_status(
        &self,
        credentials: &GatewayCredentials,
        order_id: &str,
        amount: i64,
    ) -> AppResult<GatewayTransactionStatus>;
}
