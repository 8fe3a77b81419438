use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::{
        ports::notifier::NotificationGatewayPort,
        use_cases::ledger::{
            BillingSettings, InvoiceRepoTrait, NotificationLogTrait, TenantDirectoryTrait,
        },
    },
    domain::entities::notification_kind::NotificationKind,
};

/// Sends due-date reminders for pending invoices.
///
/// At most one reminder per tenant per calendar day: the notification log is
/// the cross-run dedup key, and an in-run set keeps a tenant with several
/// qualifying invoices (or a failed send) from being attempted twice in the
/// same sweep. A failed send leaves no log record, so the tenant becomes
/// eligible again on the next run.
#[derive(Clone)]
pub struct ReminderUseCases {
    invoices: Arc<dyn InvoiceRepoTrait>,
    tenants: Arc<dyn TenantDirectoryTrait>,
    notifications: Arc<dyn NotificationLogTrait>,
    notifier: Arc<dyn NotificationGatewayPort>,
    settings: BillingSettings,
}

impl ReminderUseCases {
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

    pub async fn run_reminders(&self, today: NaiveDate) -> AppResult<()> {
        let offsets = self.settings.reminder_offsets().await?;
        let pending = self.invoices.list_pending().await?;

        let mut attempted: HashSet<Uuid> = HashSet::new();
        let mut sent = 0usize;

        for invoice in pending {
            // Whole-day calendar arithmetic; negative once past due.
            let days_until_due = invoice.due_date.signed_duration_since(today).num_days();
            if !offsets.contains(&days_until_due) {
                continue;
            }

            // One attempt per tenant per run, however many invoices qualify.
            if !attempted.insert(invoice.tenant_id) {
                continue;
            }

            match self
                .notifications
                .sent_on(invoice.tenant_id, NotificationKind::Reminder, today)
                .await
            {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    error!(tenant_id = %invoice.tenant_id, error = %e, "Reminder dedup lookup failed");
                    continue;
                }
            }

            let tenant = match self.tenants.get(invoice.tenant_id).await {
                Ok(Some(t)) => t,
                Ok(None) => {
                    warn!(tenant_id = %invoice.tenant_id, "Pending invoice for unknown tenant");
                    continue;
                }
                Err(e) => {
                    error!(tenant_id = %invoice.tenant_id, error = %e, "Tenant lookup failed");
                    continue;
                }
            };

            match self
                .notifier
                .send_reminder(&tenant, &invoice, days_until_due)
                .await
            {
                Ok(()) => {
                    sent += 1;
                    let message = reminder_log_line(days_until_due);
                    if let Err(e) = self
                        .notifications
                        .append(tenant.id, NotificationKind::Reminder, &message)
                        .await
                    {
                        // Worst case the tenant is reminded again today.
                        error!(tenant_id = %tenant.id, error = %e, "Failed to record reminder");
                    }
                }
                Err(e) => {
                    // Not retried this run; eligible again on the next one.
                    warn!(tenant_id = %tenant.id, error = %e, "Reminder delivery failed");
                }
            }
        }

        info!(date = %today, sent, "Reminder sweep finished");
        Ok(())
    }
}

fn reminder_log_line(days_until_due: i64) -> String {
    if days_until_due > 0 {
        format!("Payment reminder sent (due in {} days)", days_until_due)
    } else if days_until_due == 0 {
        "Payment reminder sent (due today)".to_string()
    } else {
        "Payment reminder sent (past due)".to_string()
    }
}
