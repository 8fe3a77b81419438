use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::notifier::NotificationGatewayPort,
        use_cases::{billing_period::BillingPeriod, ledger::InvoiceProfile},
    },
    domain::entities::tenant::TenantProfile,
};

/// Notifier that posts messages to a WhatsApp HTTP gateway.
///
/// The gateway's own connection/session handling is its problem; from here it
/// is an opaque send capability that either succeeds or fails.
pub struct WhatsAppNotifier {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

impl WhatsAppNotifier {
    pub fn new(base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }

    async fn send(&self, phone_number: &str, message: &str) -> AppResult<()> {
        let phone = format_phone_number(phone_number);

        let mut request = self.client.post(self.base_url.clone()).json(&SendMessageRequest {
            phone: &phone,
            message,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Message gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Message gateway returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationGatewayPort for WhatsAppNotifier {
    async fn send_reminder(
        &self,
        tenant: &TenantProfile,
        invoice: &InvoiceProfile,
        days_until_due: i64,
    ) -> AppResult<()> {
        let message = reminder_message(tenant, invoice, days_until_due);
        self.send(&tenant.phone_number, &message).await
    }

    async fn send_disconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        let message = disconnection_message(tenant);
        self.send(&tenant.phone_number, &message).await
    }

    async fn send_reconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        let message = reconnection_message(tenant);
        self.send(&tenant.phone_number, &message).await
    }
}

// ============================================================================
// Message templates
// ============================================================================

fn reminder_message(tenant: &TenantProfile, invoice: &InvoiceProfile, days_until_due: i64) -> String {
    let tone = if days_until_due > 0 {
        format!("Your invoice is due in {} days.", days_until_due)
    } else if days_until_due == 0 {
        "Your invoice is due TODAY.".to_string()
    } else {
        "Your invoice is PAST DUE.".to_string()
    };

    format!(
        "Hello {}!\n\n\
         PAYMENT REMINDER\n\n\
         Unit: {}\n\
         Period: {}\n\
         Amount: Rp {}\n\
         Due date: {}\n\n\
         {}\n\n\
         Please pay promptly to avoid service interruption.\n\n\
         Thank you!\n_netfee_",
        tenant.name,
        tenant.unit_name,
        invoice.period().label(),
        format_rupiah(invoice.amount),
        format_date(invoice.due_date),
        tone,
    )
}

fn disconnection_message(tenant: &TenantProfile) -> String {
    format!(
        "Hello {},\n\n\
         SERVICE DISCONNECTION NOTICE\n\n\
         Unit: {}\n\n\
         Your internet service has been DEACTIVATED due to an unpaid invoice.\n\
         To restore service, please settle the outstanding amount and contact the administrator.\n\n\
         Thank you for your understanding.\n_netfee_",
        tenant.name, tenant.unit_name,
    )
}

fn reconnection_message(tenant: &TenantProfile) -> String {
    format!(
        "Hello {}!\n\n\
         SERVICE ACTIVE\n\n\
         Unit: {}\n\n\
         Your payment has been confirmed and your internet service is ACTIVE again.\n\n\
         Thank you!\n_netfee_",
        tenant.name, tenant.unit_name,
    )
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// Normalize to international form for the gateway: a leading 0 becomes the
/// 62 country code, and anything non-numeric is stripped.
fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        format!("62{}", rest)
    } else {
        digits
    }
}

/// Indonesian thousands grouping: 1500000 -> "1.500.000".
fn format_rupiah(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    format!(
        "{} {}",
        date.day(),
        BillingPeriod {
            month: date.month(),
            year: date.year()
        }
        .label()
    )
}
