use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            notifier::NotificationGatewayPort,
            payment_gateway::{GatewayTransaction, PaymentGatewayPort},
        },
        use_cases::ledger::{
            BillingSettings, GatewayCredentials, InvoiceProfile, InvoiceRepoTrait, NewInvoice,
            NotificationLogTrait, TenantDirectoryTrait,
        },
    },
    domain::entities::{
        gateway_method::GatewayMethod, invoice_status::InvoiceStatus,
        notification_kind::NotificationKind,
    },
};

/// Provider status string that marks a settled transaction. Anything else is
/// an interim or failed state and is acknowledged without processing.
pub const COMPLETED_STATUS: &str = "completed";

/// Prefix for gateway order ids generated by this service.
const ORDER_PREFIX: &str = "NF";

// ============================================================================
// Event and outcome types
// ============================================================================

/// Canonical settlement event, as translated from the provider webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementEvent {
    pub order_id: String,
    pub amount: i64,
    pub status: String,
    pub project: String,
    pub payment_method: Option<String>,
    pub completed_at: Option<String>,
}

/// Why an event was accepted without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    StatusNotCompleted,
    AlreadySettled,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::StatusNotCompleted => "status_not_completed",
            IgnoreReason::AlreadySettled => "already_settled",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The invoice was marked paid by this event.
    Settled {
        invoice_id: Uuid,
        tenant_id: Uuid,
        tenant_reactivated: bool,
    },
    /// Accepted no-op (interim status or replayed delivery).
    Ignored { reason: IgnoreReason },
}

/// Result of a gateway creation call for an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionInitiation {
    pub invoice_id: Uuid,
    pub order_id: String,
    pub method: GatewayMethod,
    pub amount: i64,
    pub payment_number: Option<String>,
    pub total_amount: Option<i64>,
    pub expires_at: Option<NaiveDateTime>,
    /// Scannable payload for QR methods, `None` for bank transfers.
    pub qr_string: Option<String>,
}

/// Read-only local + provider status pair for "check my payment" flows.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCheck {
    pub invoice_id: Uuid,
    pub local_status: InvoiceStatus,
    pub gateway_status: String,
    pub order_id: Option<String>,
    pub method: Option<GatewayMethod>,
    pub expires_at: Option<NaiveDateTime>,
    pub paid_at: Option<NaiveDateTime>,
}

// ============================================================================
// Use Cases
// ============================================================================

/// Reconciles asynchronous settlement events against the invoice ledger, and
/// hosts the gateway-facing creation/status flows.
///
/// Reconciliation is replay-safe: the paid transition is a conditional update
/// and a duplicate delivery for a settled invoice is an accepted no-op. The
/// invoice commit always precedes the tenant flag write; the flag is
/// re-asserted on replay so a crash between the two is repaired by the
/// gateway's own retry policy.
#[derive(Clone)]
pub struct ReconciliationUseCases {
    invoices: Arc<dyn InvoiceRepoTrait>,
    tenants: Arc<dyn TenantDirectoryTrait>,
    notifications: Arc<dyn NotificationLogTrait>,
    notifier: Arc<dyn NotificationGatewayPort>,
    gateway: Arc<dyn PaymentGatewayPort>,
    settings: BillingSettings,
}

impl ReconciliationUseCases {
    pub fn new(
        invoices: Arc<dyn InvoiceRepoTrait>,
        tenants: Arc<dyn TenantDirectoryTrait>,
        notifications: Arc<dyn NotificationLogTrait>,
        notifier: Arc<dyn NotificationGatewayPort>,
        gateway: Arc<dyn PaymentGatewayPort>,
        settings: BillingSettings,
    ) -> Self {
        Self {
            invoices,
            tenants,
            notifications,
            notifier,
            gateway,
            settings,
        }
    }

    pub async fn reconcile(&self, event: &SettlementEvent) -> AppResult<ReconcileOutcome> {
        // 1. Interim and failed provider states are acknowledged, not errors.
        if event.status != COMPLETED_STATUS {
            return Ok(ReconcileOutcome::Ignored {
                reason: IgnoreReason::StatusNotCompleted,
            });
        }

        // 2. The event must belong to our configured gateway project.
        let credentials = self
            .settings
            .gateway_credentials()
            .await?
            .ok_or(AppError::GatewayNotConfigured)?;
        if event.project != credentials.project {
            warn!(
                event_project = %event.project,
                "Settlement rejected: gateway project mismatch"
            );
            return Err(AppError::GatewayProjectMismatch);
        }

        // 3. The order reference must resolve to exactly one invoice.
        let invoice = self
            .invoices
            .get_by_order_id(&event.order_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // 4. Amount tampering guard: exact match or nothing moves.
        if event.amount != invoice.amount {
            warn!(
                invoice_id = %invoice.id,
                claimed = event.amount,
                stored = invoice.amount,
                "Settlement rejected: amount mismatch"
            );
            return Err(AppError::AmountMismatch);
        }

        // 5. Replayed delivery for a settled invoice is a no-op. Re-assert
        // the tenant flag so a crash after a previous paid-commit heals here.
        if invoice.status == InvoiceStatus::Paid {
            self.reassert_active(invoice.tenant_id).await;
            return Ok(ReconcileOutcome::Ignored {
                reason: IgnoreReason::AlreadySettled,
            });
        }

        let method = event
            .payment_method
            .as_deref()
            .and_then(|m| m.parse::<GatewayMethod>().ok());
        let note = settlement_note(event);

        // Conditional paid transition; losing the race means a concurrent
        // delivery settled the invoice first.
        let now = Utc::now().naive_utc();
        if !self
            .invoices
            .mark_paid(invoice.id, now, method, &note)
            .await?
        {
            self.reassert_active(invoice.tenant_id).await;
            return Ok(ReconcileOutcome::Ignored {
                reason: IgnoreReason::AlreadySettled,
            });
        }

        info!(
            invoice_id = %invoice.id,
            tenant_id = %invoice.tenant_id,
            order_id = %event.order_id,
            "Invoice settled via gateway webhook"
        );

        // Invoice is committed; everything below is best-effort and must not
        // fail the settlement.
        let tenant_reactivated = match self.tenants.set_active(invoice.tenant_id, true).await {
            Ok(flipped) => flipped,
            Err(e) => {
                // Recovered on replay via reassert_active.
                error!(tenant_id = %invoice.tenant_id, error = %e, "Failed to reactivate tenant");
                false
            }
        };

        self.create_next_invoice(&invoice).await;

        if let Err(e) = self
            .notifications
            .append(
                invoice.tenant_id,
                NotificationKind::PaymentReceived,
                &format!(
                    "Payment received via {}: Rp {}",
                    event.payment_method.as_deref().unwrap_or("gateway"),
                    event.amount
                ),
            )
            .await
        {
            error!(tenant_id = %invoice.tenant_id, error = %e, "Failed to record payment_received");
        }

        if tenant_reactivated {
            self.send_reconnection_notice(invoice.tenant_id).await;
        }

        Ok(ReconcileOutcome::Settled {
            invoice_id: invoice.id,
            tenant_id: invoice.tenant_id,
            tenant_reactivated,
        })
    }

    /// Create a provider transaction for an invoice. No invoice mutation
    /// happens until the provider response is known.
    pub async fn create_transaction(
        &self,
        invoice_id: Uuid,
        method: GatewayMethod,
    ) -> AppResult<TransactionInitiation> {
        let invoice = self
            .invoices
            .get_by_id(invoice_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if invoice.status.is_settled() {
            return Err(AppError::InvalidInput("Invoice is already paid".into()));
        }

        let credentials = self
            .settings
            .gateway_credentials()
            .await?
            .ok_or(AppError::GatewayNotConfigured)?;

        let order_id = new_order_id(invoice.id);

        let transaction = self
            .gateway
            .create_transaction(&credentials, method, &order_id, invoice.amount)
            .await?;

        self.invoices
            .set_gateway_order(invoice.id, &order_id, method, transaction.expires_at)
            .await?;

        Ok(build_initiation(&invoice, order_id, method, transaction))
    }

    /// Poll the provider for an invoice's transaction status. Strictly
    /// read-only: state changes only ever arrive through `reconcile`.
    pub async fn check_status(&self, invoice_id: Uuid) -> AppResult<StatusCheck> {
        let invoice = self
            .invoices
            .get_by_id(invoice_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let order_id = match invoice.gateway_order_id.clone() {
            Some(id) => id,
            None => {
                return Ok(StatusCheck {
                    invoice_id: invoice.id,
                    local_status: invoice.status,
                    gateway_status: "not_created".to_string(),
                    order_id: None,
                    method: invoice.gateway_method,
                    expires_at: invoice.gateway_expires_at,
                    paid_at: invoice.paid_at,
                });
            }
        };

        let credentials = self
            .settings
            .gateway_credentials()
            .await?
            .ok_or(AppError::GatewayNotConfigured)?;

        let provider = self
            .gateway
            .transaction_status(&credentials, &order_id, invoice.amount)
            .await?;

        Ok(StatusCheck {
            invoice_id: invoice.id,
            local_status: invoice.status,
            gateway_status: provider.status,
            order_id: Some(order_id),
            method: invoice.gateway_method,
            expires_at: invoice.gateway_expires_at,
            paid_at: invoice.paid_at,
        })
    }

    /// Roll the ledger forward: one pending invoice for the period after the
    /// one just settled, deduplicated against the scheduled generator.
    async fn create_next_invoice(&self, paid: &InvoiceProfile) {
        let next = paid.period().next();

        let fee = match self.settings.monthly_fee().await {
            Ok(fee) => fee,
            Err(e) => {
                error!(error = %e, "Failed to read fee for next-period invoice");
                return;
            }
        };

        let input = NewInvoice {
            tenant_id: paid.tenant_id,
            amount: fee,
            period: next,
            due_date: next.payment_due_date(),
        };

        match self.invoices.insert_if_absent(&input).await {
            Ok(outcome) if outcome.was_created() => {
                info!(
                    tenant_id = %paid.tenant_id,
                    month = next.month,
                    year = next.year,
                    "Created next-period invoice"
                );
            }
            Ok(_) => {}
            Err(e) => {
                // The scheduled generator is the idempotent backstop.
                error!(
                    tenant_id = %paid.tenant_id,
                    error = %e,
                    "Failed to create next-period invoice"
                );
            }
        }
    }

    async fn reassert_active(&self, tenant_id: Uuid) {
        match self.tenants.set_active(tenant_id, true).await {
            Ok(true) => {
                info!(tenant_id = %tenant_id, "Re-derived active flag from settled invoice");
                self.send_reconnection_notice(tenant_id).await;
            }
            Ok(false) => {}
            Err(e) => {
                error!(tenant_id = %tenant_id, error = %e, "Failed to re-assert active flag");
            }
        }
    }

    async fn send_reconnection_notice(&self, tenant_id: Uuid) {
        let tenant = match self.tenants.get(tenant_id).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                warn!(tenant_id = %tenant_id, "Settled invoice for unknown tenant");
                return;
            }
            Err(e) => {
                error!(tenant_id = %tenant_id, error = %e, "Tenant lookup failed");
                return;
            }
        };

        match self.notifier.send_reconnection_notice(&tenant).await {
            Ok(()) => {
                if let Err(e) = self
                    .notifications
                    .append(
                        tenant.id,
                        NotificationKind::Reconnection,
                        "Service reactivated after payment",
                    )
                    .await
                {
                    error!(tenant_id = %tenant.id, error = %e, "Failed to record reconnection notice");
                }
            }
            Err(e) => {
                warn!(tenant_id = %tenant.id, error = %e, "Reconnection notice delivery failed");
            }
        }
    }
}

fn settlement_note(event: &SettlementEvent) -> String {
    format!(
        "Settled via {} at {}",
        event.payment_method.as_deref().unwrap_or("gateway"),
        event.completed_at.as_deref().unwrap_or("unknown time")
    )
}

fn new_order_id(invoice_id: Uuid) -> String {
    let invoice_ref = invoice_id.simple().to_string();
    format!(
        "{}-{}-{}",
        ORDER_PREFIX,
        &invoice_ref[..8],
        Utc::now().timestamp_millis()
    )
}

fn build_initiation(
    invoice: &InvoiceProfile,
    order_id: String,
    method: GatewayMethod,
    transaction: GatewayTransaction,
) -> TransactionInitiation {
    let qr_string = method
        .is_qr()
        .then(|| transaction.payment_number.clone())
        .flatten();

    TransactionInitiation {
        invoice_id: invoice.id,
        order_id,
        method,
        amount: invoice.amount,
        payment_number: transaction.payment_number,
        total_amount: transaction.total_amount,
        expires_at: transaction.expires_at,
        qr_string,
    }
}
