use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{GatewayTransaction, GatewayTransactionStatus, PaymentGatewayPort},
        use_cases::ledger::GatewayCredentials,
    },
    domain::entities::gateway_method::GatewayMethod,
};

/// HTTP client for the Pakasir payment API.
///
/// Both operations are on the critical path of user-facing flows, so any
/// transport or provider error is surfaced as `AppError::Upstream` for the
/// caller to retry.
#[derive(Clone)]
pub struct PakasirClient {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct CreateTransactionRequest<'a> {
    project: &'a str,
    order_id: &'a str,
    amount: i64,
    api_key: &'a str,
}

#[derive(Deserialize)]
struct CreateTransactionResponse {
    error: Option<String>,
    payment: Option<PakasirPayment>,
}

#[derive(Deserialize)]
struct PakasirPayment {
    payment_number: Option<String>,
    total_payment: Option<i64>,
    expired_at: Option<String>,
}

#[derive(Deserialize)]
struct TransactionDetailResponse {
    error: Option<String>,
    transaction: Option<PakasirTransaction>,
}

#[derive(Deserialize)]
struct PakasirTransaction {
    status: Option<String>,
}

impl PakasirClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        // Url::join treats the base as a directory only with a trailing slash.
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| AppError::Internal(format!("Invalid gateway URL: {}", e)))
    }
}

#[async_trait]
impl PaymentGatewayPort for PakasirClient {
    async fn create_transaction(
        &self,
        credentials: &GatewayCredentials,
        method: GatewayMethod,
        order_id: &str,
        amount: i64,
    ) -> AppResult<GatewayTransaction> {
        let url = self.endpoint(&format!("transactioncreate/{}", method.as_str()))?;

        let response = self
            .client
            .post(url)
            .json(&CreateTransactionRequest {
                project: &credentials.project,
                order_id,
                amount,
                api_key: credentials.api_key.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Gateway returned {} for transaction create",
                status
            )));
        }

        let body: CreateTransactionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid gateway response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(AppError::Upstream(error));
        }

        let payment = body
            .payment
            .ok_or_else(|| AppError::Upstream("Gateway response missing payment".into()))?;

        Ok(GatewayTransaction {
            payment_number: payment.payment_number,
            total_amount: payment.total_payment,
            expires_at: payment.expired_at.as_deref().and_then(parse_timestamp),
        })
    }

    async fn transaction_status(
        &self,
        credentials: &GatewayCredentials,
        order_id: &str,
        amount: i64,
    ) -> AppResult<GatewayTransactionStatus> {
        let url = self.endpoint("transactiondetail")?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("project", credentials.project.as_str()),
                ("order_id", order_id),
                ("amount", &amount.to_string()),
                ("api_key", credentials.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Gateway returned {} for transaction detail",
                status
            )));
        }

        let body: TransactionDetailResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid gateway response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(AppError::Upstream(error));
        }

        let status = body
            .transaction
            .and_then(|t| t.status)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(GatewayTransactionStatus { status })
    }
}

/// The provider reports timestamps either as RFC 3339 or as a bare
/// "YYYY-MM-DD HH:MM:SS"; anything else is dropped rather than guessed at.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}
