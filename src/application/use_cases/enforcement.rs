use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::{
    app_error::AppResult,
    application::{
        ports::notifier::NotificationGatewayPort,
        use_cases::ledger::{
            BillingSettings, InvoiceProfile, InvoiceRepoTrait, NotificationLogTrait,
            TenantDirectoryTrait,
        },
    },
    domain::entities::{invoice_status::InvoiceStatus, notification_kind::NotificationKind},
};

/// Transitions past-due pending invoices to overdue and disconnects their
/// tenants.
///
/// An invoice is overdue only strictly after its due date: on the due date
/// itself the reminder sweep's offset 0 applies, not enforcement.
///
/// The disconnection notice is gated on the tenant's active flag at the
/// moment of the flip, not on invoice status, so repeated sweeps and tenants
/// deactivated by other means are never re-notified. Already-overdue invoices
/// are revisited so a crash between the invoice commit and the flag write is
/// repaired on the next sweep.
#[derive(Clone)]
pub struct EnforcementUseCases {
    invoices: Arc<dyn InvoiceRepoTrait>,
    tenants: Arc<dyn TenantDirectoryTrait>,
    notifications: Arc<dyn NotificationLogTrait>,
    notifier: Arc<dyn NotificationGatewayPort>,
    settings: BillingSettings,
}

impl EnforcementUseCases {
    pub fn new(
        invoices: Arc<dyn InvoiceRepoTrait>,
        tenants: Arc<dyn TenantDirectoryTrait>,
        notifications: Arc<dyn NotificationLogTrait>,
        notifier: Arc<dyn NotificationGatewayPort>,
        settings: BillingSettings,
    ) -> Self {
        Self {
            invoices,
            tenants,
            notifications,
            notifier,
            settings,
        }
    }

    pub async fn run_enforcement(&self, today: NaiveDate) -> AppResult<()> {
        if !self.settings.auto_disconnect_enabled().await? {
            debug!("Auto disconnect is disabled, skipping enforcement sweep");
            return Ok(());
        }

        let enforceable = self.invoices.list_enforceable(today).await?;
        let mut transitioned = 0usize;
        let mut disconnected = 0usize;

        for invoice in enforceable {
            match self.enforce_one(&invoice).await {
                Ok((did_transition, did_disconnect)) => {
                    transitioned += did_transition as usize;
                    disconnected += did_disconnect as usize;
                }
                Err(e) => {
                    // Log and continue; one tenant never blocks the sweep.
                    error!(
                        invoice_id = %invoice.id,
                        tenant_id = %invoice.tenant_id,
                        error = %e,
                        "Enforcement failed for invoice"
                    );
                }
            }
        }

        info!(date = %today, transitioned, disconnected, "Enforcement sweep finished");
        Ok(())
    }

    async fn enforce_one(&self, invoice: &InvoiceProfile) -> AppResult<(bool, bool)> {
        let mut did_transition = false;

        match invoice.status {
            InvoiceStatus::Pending => {
                // Conditional transition; losing the race (a settlement landed
                // between the listing and here) means hands off the tenant.
                if !self.invoices.mark_overdue(invoice.id).await? {
                    return Ok((false, false));
                }
                did_transition = true;
            }
            InvoiceStatus::Overdue => {
                // Flag-recovery pass. Re-read so a settlement that landed
                // since the listing keeps the tenant connected.
                match self.invoices.get_by_id(invoice.id).await? {
                    Some(current) if current.status == InvoiceStatus::Overdue => {}
                    _ => return Ok((false, false)),
                }
            }
            InvoiceStatus::Paid => return Ok((false, false)),
        }

        // Only an actual active -> inactive flip notifies, exactly once.
        let flipped = self.tenants.set_active(invoice.tenant_id, false).await?;
        if !flipped {
            return Ok((did_transition, false));
        }

        let tenant = match self.tenants.get(invoice.tenant_id).await? {
            Some(t) => t,
            None => {
                warn!(tenant_id = %invoice.tenant_id, "Overdue invoice for unknown tenant");
                return Ok((did_transition, true));
            }
        };

        match self.notifier.send_disconnection_notice(&tenant).await {
            Ok(()) => {
                if let Err(e) = self
                    .notifications
                    .append(
                        tenant.id,
                        NotificationKind::Disconnection,
                        "Service disconnected for overdue invoice",
                    )
                    .await
                {
                    error!(tenant_id = %tenant.id, error = %e, "Failed to record disconnection notice");
                }
            }
            Err(e) => {
                warn!(tenant_id = %tenant.id, error = %e, "Disconnection notice delivery failed");
            }
        }

        Ok((did_transition, true))
    }
}
