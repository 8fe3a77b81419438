//! Recording/stub implementations of the outbound ports.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            notifier::NotificationGatewayPort,
            payment_gateway::{GatewayTransaction, GatewayTransactionStatus, PaymentGatewayPort},
        },
        use_cases::ledger::{GatewayCredentials, InvoiceProfile},
    },
    domain::entities::{gateway_method::GatewayMethod, tenant::TenantProfile},
};

// ============================================================================
// RecordingNotifier
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentKind {
    Reminder { days_until_due: i64 },
    Disconnection,
    Reconnection,
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub tenant_id: Uuid,
    pub kind: SentKind,
}

/// Notifier that records successful sends and can be told to fail for
/// specific tenants.
#[derive(Default)]
pub struct RecordingNotifier {
    sent_log: Mutex<Vec<SentNotification>>,
    failing: Mutex<HashSet<Uuid>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent_log.lock().unwrap().clone()
    }

    pub fn fail_for(&self, tenant_id: Uuid) {
        self.failing.lock().unwrap().insert(tenant_id);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn deliver(&self, tenant_id: Uuid, kind: SentKind) -> AppResult<()> {
        if self.failing.lock().unwrap().contains(&tenant_id) {
            return Err(AppError::Upstream("simulated delivery failure".into()));
        }
        self.sent_log
            .lock()
            .unwrap()
            .push(SentNotification { tenant_id, kind });
        Ok(())
    }
}

#[async_trait]
impl NotificationGatewayPort for RecordingNotifier {
    async fn send_reminder(
        &self,
        tenant: &TenantProfile,
        _invoice: &InvoiceProfile,
        days_until_due: i64,
    ) -> AppResult<()> {
        self.deliver(tenant.id, SentKind::Reminder { days_until_due })
    }

    async fn send_disconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        self.deliver(tenant.id, SentKind::Disconnection)
    }

    async fn send_reconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        self.deliver(tenant.id, SentKind::Reconnection)
    }
}

// ============================================================================
// StubPaymentGateway
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    pub order_id: String,
    pub method: GatewayMethod,
    pub amount: i64,
}

/// Gateway stub with a settable provider status and one-shot create failure.
pub struct StubPaymentGateway {
    status: Mutex<String>,
    fail_next_create: Mutex<bool>,
    created: Mutex<Vec<CreatedTransaction>>,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self {
            status: Mutex::new("pending".to_string()),
            fail_next_create: Mutex::new(false),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: &str) {
        *self.status.lock().unwrap() = status.to_string();
    }

    pub fn fail_next_create(&self) {
        *self.fail_next_create.lock().unwrap() = true;
    }

    pub fn created(&self) -> Vec<CreatedTransaction> {
        self.created.lock().unwrap().clone()
    }
}

impl Default for StubPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGatewayPort for StubPaymentGateway {
    async fn create_transaction(
        &self,
        _credentials: &GatewayCredentials,
        method: GatewayMethod,
        order_id: &str,
        amount: i64,
    ) -> AppResult<GatewayTransaction> {
        let mut fail = self.fail_next_create.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(AppError::Upstream("simulated gateway outage".into()));
        }
        drop(fail);

        self.created.lock().unwrap().push(CreatedTransaction {
            order_id: order_id.to_string(),
            method,
            amount,
        });

        Ok(GatewayTransaction {
            payment_number: Some(format!("PAY-{}", order_id)),
            total_amount: Some(amount),
            expires_at: None,
        })
    }

    async fn transaction_status(
        &self,
        _credentials: &GatewayCredentials,
        _order_id: &str,
        _amount: i64,
    ) -> AppResult<GatewayTransactionStatus> {
        Ok(GatewayTransactionStatus {
            status: self.status.lock().unwrap().clone(),
        })
    }
}
