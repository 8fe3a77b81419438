//! Test data factories. Each creates a complete, valid object with sensible
//! defaults; use the closure parameter to override fields as needed.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    application::use_cases::ledger::InvoiceProfile,
    domain::entities::{invoice_status::InvoiceStatus, tenant::TenantProfile},
};

fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Create a test tenant with sensible defaults.
pub fn create_test_tenant(overrides: impl FnOnce(&mut TenantProfile)) -> TenantProfile {
    let mut tenant = TenantProfile {
        id: Uuid::new_v4(),
        name: "Test Tenant".to_string(),
        unit_name: "A-01".to_string(),
        phone_number: "081234567890".to_string(),
        bandwidth_limit_kbps: Some(20_000),
        is_active: true,
        created_at: Some(test_datetime()),
    };
    overrides(&mut tenant);
    tenant
}

/// Create a test invoice for period (6, 2024), due 2024-07-05, pending.
pub fn create_test_invoice(
    tenant_id: Uuid,
    overrides: impl FnOnce(&mut InvoiceProfile),
) -> InvoiceProfile {
    let mut invoice = InvoiceProfile {
        id: Uuid::new_v4(),
        tenant_id,
        amount: 100_000,
        period_month: 6,
        period_year: 2024,
        due_date: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
        status: InvoiceStatus::Pending,
        paid_at: None,
        gateway_order_id: None,
        gateway_method: None,
        gateway_expires_at: None,
        notes: None,
        created_at: Some(test_datetime()),
    };
    overrides(&mut invoice);
    invoice
}
