use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::use_cases::billing_period::BillingPeriod,
    domain::entities::{
        gateway_method::GatewayMethod, invoice_status::InvoiceStatus,
        notification_kind::NotificationKind, tenant::TenantProfile,
    },
};

// ============================================================================
// Settings keys and defaults
// ============================================================================

pub const SETTING_MONTHLY_FEE: &str = "monthly_fee";
pub const SETTING_REMINDER_DAYS: &str = "reminder_days";
pub const SETTING_AUTO_DISCONNECT: &str = "auto_disconnect";
pub const SETTING_GATEWAY_PROJECT: &str = "pakasir_project";
pub const SETTING_GATEWAY_API_KEY: &str = "pakasir_api_key";

pub const DEFAULT_MONTHLY_FEE: i64 = 100_000;
pub const DEFAULT_REMINDER_DAYS: [i64; 3] = [3, 1, 0];

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceProfile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Rupiah, no minor units.
    pub amount: i64,
    pub period_month: u32,
    pub period_year: i32,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub paid_at: Option<NaiveDateTime>,
    pub gateway_order_id: Option<String>,
    pub gateway_method: Option<GatewayMethod>,
    pub gateway_expires_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl InvoiceProfile {
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            month: self.period_month,
            year: self.period_year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub tenant_id: Uuid,
    pub amount: i64,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
}

/// Result of an insert-if-absent. Duplicate creation is a designed no-op,
/// never an error surfaced to callers.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Created(InvoiceProfile),
    AlreadyExists,
}

impl InsertOutcome {
    pub fn was_created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }
}

// ============================================================================
// Repository Traits
// ============================================================================

/// Durable invoice ledger. The only legal creation primitive is the atomic
/// insert-if-absent backed by the store's unique (tenant, period) key, and
/// every status transition is conditional on the expected current status.
#[async_trait]
pub trait InvoiceRepoTrait: Send + Sync {
    async fn insert_if_absent(&self, input: &NewInvoice) -> AppResult<InsertOutcome>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<InvoiceProfile>>;

    async fn get_by_order_id(&self, order_id: &str) -> AppResult<Option<InvoiceProfile>>;

    async fn list_pending(&self) -> AppResult<Vec<InvoiceProfile>>;

    /// Pending and overdue invoices strictly past due as of `today`.
    /// Includes already-overdue rows so the enforcement sweep can re-derive
    /// the tenant flag after a crash between invoice commit and flag write.
    async fn list_enforceable(&self, today: NaiveDate) -> AppResult<Vec<InvoiceProfile>>;

    /// Conditional `pending -> overdue`. Returns whether the transition
    /// happened; `false` means the invoice was no longer pending.
    async fn mark_overdue(&self, id: Uuid) -> AppResult<bool>;

    /// Conditional `pending/overdue -> paid`. Returns whether the transition
    /// happened; `false` means the invoice was already paid.
    async fn mark_paid(
        &self,
        id: Uuid,
        paid_at: NaiveDateTime,
        method: Option<GatewayMethod>,
        note: &str,
    ) -> AppResult<bool>;

    /// Store the gateway order correlation after a successful creation call.
    async fn set_gateway_order(
        &self,
        id: Uuid,
        order_id: &str,
        method: GatewayMethod,
        expires_at: Option<NaiveDateTime>,
    ) -> AppResult<()>;
}

/// Read contact info, write only the active flag. `set_active` is a
/// conditional flip so callers observe each transition exactly once.
#[async_trait]
pub trait TenantDirectoryTrait: Send + Sync {
    async fn list_ids(&self) -> AppResult<Vec<Uuid>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<TenantProfile>>;

    /// Returns `true` only when the flag actually changed.
    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<bool>;
}

/// Append-only notification log. Queried only for the same-day reminder
/// dedup key (tenant, kind, calendar date of sent_at).
#[async_trait]
pub trait NotificationLogTrait: Send + Sync {
    async fn append(&self, tenant_id: Uuid, kind: NotificationKind, message: &str)
    -> AppResult<()>;

    async fn sent_on(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        date: NaiveDate,
    ) -> AppResult<bool>;
}

/// External key/value configuration store, read-only from the engine.
#[async_trait]
pub trait SettingsStoreTrait: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
}

// ============================================================================
// Typed settings reader
// ============================================================================

#[derive(Clone)]
pub struct GatewayCredentials {
    pub project: String,
    pub api_key: SecretString,
}

/// Typed view over the settings store. Values are read at call time, not
/// cached, so fee or offset changes take effect on the next sweep.
#[derive(Clone)]
pub struct BillingSettings {
    store: Arc<dyn SettingsStoreTrait>,
}

impl BillingSettings {
    pub fn new(store: Arc<dyn SettingsStoreTrait>) -> Self {
        Self { store }
    }

    pub async fn monthly_fee(&self) -> AppResult<i64> {
        let fee = self
            .store
            .get(SETTING_MONTHLY_FEE)
            .await?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_MONTHLY_FEE);
        Ok(fee)
    }

    /// Reminder day offsets relative to the due date. Any sign is allowed;
    /// unparseable entries are dropped.
    pub async fn reminder_offsets(&self) -> AppResult<Vec<i64>> {
        let raw = match self.store.get(SETTING_REMINDER_DAYS).await? {
            Some(v) => v,
            None => return Ok(DEFAULT_REMINDER_DAYS.to_vec()),
        };
        let offsets: Vec<i64> = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect();
        if offsets.is_empty() {
            return Ok(DEFAULT_REMINDER_DAYS.to_vec());
        }
        Ok(offsets)
    }

    /// Enforcement is active only for the exact string "true".
    pub async fn auto_disconnect_enabled(&self) -> AppResult<bool> {
        Ok(self
            .store
            .get(SETTING_AUTO_DISCONNECT)
            .await?
            .map(|v| v == "true")
            .unwrap_or(false))
    }

    pub async fn gateway_credentials(&self) -> AppResult<Option<GatewayCredentials>> {
        let project = self.store.get(SETTING_GATEWAY_PROJECT).await?;
        let api_key = self.store.get(SETTING_GATEWAY_API_KEY).await?;
        match (project, api_key) {
            (Some(project), Some(api_key)) if !project.is_empty() && !api_key.is_empty() => {
                Ok(Some(GatewayCredentials {
                    project,
                    api_key: SecretString::new(api_key.into()),
                }))
            }
            _ => Ok(None),
        }
    }
}
