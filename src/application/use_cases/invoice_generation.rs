use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::{
    app_error::AppResult,
    application::use_cases::{
        billing_period::BillingPeriod,
        ledger::{BillingSettings, InvoiceRepoTrait, NewInvoice, TenantDirectoryTrait},
    },
};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GenerationSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Creates one pending invoice per tenant per billing period.
///
/// Idempotent by construction: creation goes through the store's atomic
/// insert-if-absent, so overlapping invocations (manual trigger racing the
/// scheduled one) produce exactly one invoice per (tenant, period).
#[derive(Clone)]
pub struct InvoiceGenerationUseCases {
    invoices: Arc<dyn InvoiceRepoTrait>,
    tenants: Arc<dyn TenantDirectoryTrait>,
    settings: BillingSettings,
}

impl InvoiceGenerationUseCases {
    pub fn new(
        invoices: Arc<dyn InvoiceRepoTrait>,
        tenants: Arc<dyn TenantDirectoryTrait>,
        settings: BillingSettings,
    ) -> Self {
        Self {
            invoices,
            tenants,
            settings,
        }
    }

    pub async fn generate_for_period(&self, period: BillingPeriod) -> AppResult<GenerationSummary> {
        // Fee is read at call time, not pinned to any later settlement.
        let fee = self.settings.monthly_fee().await?;
        let due_date = period.payment_due_date();

        let mut summary = GenerationSummary::default();

        for tenant_id in self.tenants.list_ids().await? {
            let input = NewInvoice {
                tenant_id,
                amount: fee,
                period,
                due_date,
            };
            match self.invoices.insert_if_absent(&input).await {
                Ok(outcome) if outcome.was_created() => summary.created += 1,
                Ok(_) => summary.skipped += 1,
                Err(e) => {
                    // One tenant's failure never aborts the sweep.
                    error!(
                        tenant_id = %tenant_id,
                        month = period.month,
                        year = period.year,
                        error = %e,
                        "Failed to create invoice"
                    );
                }
            }
        }

        info!(
            month = period.month,
            year = period.year,
            created = summary.created,
            skipped = summary.skipped,
            "Invoice generation finished"
        );

        Ok(summary)
    }
}
