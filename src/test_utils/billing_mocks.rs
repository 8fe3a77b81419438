//! In-memory implementations of the repository traits.
//!
//! The invoice mock reproduces the store-level semantics the engine relies
//! on: unique-key-backed insert-if-absent and conditional status updates.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::use_cases::ledger::{
        InsertOutcome, InvoiceProfile, InvoiceRepoTrait, NewInvoice, NotificationLogTrait,
        SettingsStoreTrait, TenantDirectoryTrait,
    },
    domain::entities::{
        gateway_method::GatewayMethod, invoice_status::InvoiceStatus,
        notification_kind::NotificationKind, tenant::TenantProfile,
    },
};

// ============================================================================
// InMemoryInvoiceRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryInvoiceRepo {
    pub invoices: Mutex<HashMap<Uuid, InvoiceProfile>>,
}

impl InMemoryInvoiceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prebuilt invoice, bypassing insert-if-absent (for fixtures).
    pub fn seed(&self, invoice: InvoiceProfile) {
        self.invoices.lock().unwrap().insert(invoice.id, invoice);
    }

    pub fn all(&self) -> Vec<InvoiceProfile> {
        self.invoices.lock().unwrap().values().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<InvoiceProfile> {
        self.invoices.lock().unwrap().get(&id).cloned()
    }

    pub fn find_by_period(&self, tenant_id: Uuid, month: u32, year: i32) -> Option<InvoiceProfile> {
        self.invoices
            .lock()
            .unwrap()
            .values()
            .find(|i| i.tenant_id == tenant_id && i.period_month == month && i.period_year == year)
            .cloned()
    }
}

#[async_trait]
impl InvoiceRepoTrait for InMemoryInvoiceRepo {
    async fn insert_if_absent(&self, input: &NewInvoice) -> AppResult<InsertOutcome> {
        let mut invoices = self.invoices.lock().unwrap();

        let exists = invoices.values().any(|i| {
            i.tenant_id == input.tenant_id
                && i.period_month == input.period.month
                && i.period_year == input.period.year
        });
        if exists {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let invoice = InvoiceProfile {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            amount: input.amount,
            period_month: input.period.month,
            period_year: input.period.year,
            due_date: input.due_date,
            status: InvoiceStatus::Pending,
            paid_at: None,
            gateway_order_id: None,
            gateway_method: None,
            gateway_expires_at: None,
            notes: None,
            created_at: Some(Utc::now().naive_utc()),
        };
        invoices.insert(invoice.id, invoice.clone());
        Ok(InsertOutcome::Created(invoice))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<InvoiceProfile>> {
        Ok(self.get(id))
    }

    async fn get_by_order_id(&self, order_id: &str) -> AppResult<Option<InvoiceProfile>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .values()
            .find(|i| i.gateway_order_id.as_deref() == Some(order_id))
            .cloned())
    }

    async fn list_pending(&self) -> AppResult<Vec<InvoiceProfile>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.status == InvoiceStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_enforceable(&self, today: NaiveDate) -> AppResult<Vec<InvoiceProfile>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.status.is_payable() && i.due_date < today)
            .cloned()
            .collect())
    }

    async fn mark_overdue(&self, id: Uuid) -> AppResult<bool> {
        let mut invoices = self.invoices.lock().unwrap();
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.status == InvoiceStatus::Pending => {
                invoice.status = InvoiceStatus::Overdue;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        paid_at: NaiveDateTime,
        method: Option<GatewayMethod>,
        note: &str,
    ) -> AppResult<bool> {
        let mut invoices = self.invoices.lock().unwrap();
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.status != InvoiceStatus::Paid => {
                invoice.status = InvoiceStatus::Paid;
                invoice.paid_at = Some(paid_at);
                invoice.gateway_method = method.or(invoice.gateway_method);
                invoice.notes = Some(note.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_gateway_order(
        &self,
        id: Uuid,
        order_id: &str,
        method: GatewayMethod,
        expires_at: Option<NaiveDateTime>,
    ) -> AppResult<()> {
        let mut invoices = self.invoices.lock().unwrap();
        if let Some(invoice) = invoices.get_mut(&id) {
            invoice.gateway_order_id = Some(order_id.to_string());
            invoice.gateway_method = Some(method);
            invoice.gateway_expires_at = expires_at;
        }
        Ok(())
    }
}

// ============================================================================
// InMemoryTenantDirectory
// ============================================================================

#[derive(Default)]
pub struct InMemoryTenantDirectory {
    pub tenants: Mutex<HashMap<Uuid, TenantProfile>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenants(tenants: Vec<TenantProfile>) -> Self {
        let map: HashMap<Uuid, TenantProfile> = tenants.into_iter().map(|t| (t.id, t)).collect();
        Self {
            tenants: Mutex::new(map),
        }
    }

    pub fn insert(&self, tenant: TenantProfile) {
        self.tenants.lock().unwrap().insert(tenant.id, tenant);
    }

    pub fn get_sync(&self, id: Uuid) -> Option<TenantProfile> {
        self.tenants.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl TenantDirectoryTrait for InMemoryTenantDirectory {
    async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.tenants.lock().unwrap().keys().copied().collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<TenantProfile>> {
        Ok(self.get_sync(id))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<bool> {
        let mut tenants = self.tenants.lock().unwrap();
        match tenants.get_mut(&id) {
            Some(tenant) if tenant.is_active != active => {
                tenant.is_active = active;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ============================================================================
// InMemoryNotificationLog
// ============================================================================

#[derive(Debug, Clone)]
pub struct LoggedNotification {
    pub tenant_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Default)]
pub struct InMemoryNotificationLog {
    pub records: Mutex<Vec<LoggedNotification>>,
}

impl InMemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, tenant_id: Uuid, kind: NotificationKind) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.kind == kind)
            .count()
    }
}

#[async_trait]
impl NotificationLogTrait for InMemoryNotificationLog {
    async fn append(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> AppResult<()> {
        self.records.lock().unwrap().push(LoggedNotification {
            tenant_id,
            kind,
            message: message.to_string(),
            sent_at: Utc::now().naive_utc(),
        });
        Ok(())
    }

    async fn sent_on(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        date: NaiveDate,
    ) -> AppResult<bool> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.tenant_id == tenant_id && r.kind == kind && r.sent_at.date() == date))
    }
}

// ============================================================================
// InMemorySettingsStore
// ============================================================================

#[derive(Default)]
pub struct InMemorySettingsStore {
    pub values: Mutex<HashMap<String, String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: &[(&str, &str)]) -> Self {
        let map: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(map),
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl SettingsStoreTrait for InMemorySettingsStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }
}
