use async_trait::async_trait;

use crate::{
    app_error::AppResult, application::use_cases::ledger::InvoiceProfile,
    domain::entities::tenant::TenantProfile,
};

/// Outbound notification delivery port.
///
/// Delivery is best-effort and fire-and-forget: callers log failures and move
/// on; a send error never fails or rolls back the invoice mutation that
/// preceded it. The engine is constructed with `NoopNotificationGateway` when
/// no delivery transport is configured.
#[async_trait]
pub trait NotificationGatewayPort: Send + Sync {
    /// Payment reminder. `days_until_due` is negative once past due.
    async fn send_reminder(
        &self,
        tenant: &TenantProfile,
        invoice: &InvoiceProfile,
        days_until_due: i64,
    ) -> AppResult<()>;

    async fn send_disconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()>;

    async fn send_reconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()>;
}

/// No-op delivery for deployments without a configured message gateway.
#[derive(Default)]
pub struct NoopNotificationGateway;

#[async_trait]
impl NotificationGatewayPort for NoopNotificationGateway {
    async fn send_reminder(
        &self,
        tenant: &TenantProfile,
        _invoice: &InvoiceProfile,
        days_until_due: i64,
    ) -> AppResult<()> {
        tracing::debug!(tenant_id = %tenant.id, days_until_due, "Notifier not configured, dropping reminder");
        Ok(())
    }

    async fn send_disconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        tracing::debug!(tenant_id = %tenant.id, "Notifier not configured, dropping disconnection notice");
        Ok(())
    }

    async fn send_reconnection_notice(&self, tenant: &TenantProfile) -> AppResult<()> {
        tracing::debug!(tenant_id = %tenant.id, "Notifier not configured, dropping reconnection notice");
        Ok(())
    }
}
