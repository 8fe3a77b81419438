//! Test app state builder for HTTP-level integration testing.
//!
//! Creates an `AppState` wired to in-memory mocks, returning handles to the
//! mocks for assertions.

use std::sync::Arc;

use axum::http::HeaderValue;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        enforcement::EnforcementUseCases,
        invoice_generation::InvoiceGenerationUseCases,
        ledger::{
            BillingSettings, InvoiceProfile, SETTING_AUTO_DISCONNECT, SETTING_GATEWAY_API_KEY,
            SETTING_GATEWAY_PROJECT,
        },
        reconciliation::ReconciliationUseCases,
        reminders::ReminderUseCases,
    },
    domain::entities::tenant::TenantProfile,
    infra::config::AppConfig,
    test_utils::{
        InMemoryInvoiceRepo, InMemoryNotificationLog, InMemorySettingsStore,
        InMemoryTenantDirectory, RecordingNotifier, StubPaymentGateway,
    },
};

/// Handles to the mocks behind a test `AppState`, for assertions.
pub struct TestHandles {
    pub invoices: Arc<InMemoryInvoiceRepo>,
    pub tenants: Arc<InMemoryTenantDirectory>,
    pub notifications: Arc<InMemoryNotificationLog>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<StubPaymentGateway>,
}

pub struct TestAppStateBuilder {
    tenants: Vec<TenantProfile>,
    invoices: Vec<InvoiceProfile>,
    settings: Vec<(String, String)>,
}

impl TestAppStateBuilder {
    /// Defaults: gateway configured as project "netfee-test", auto
    /// disconnect enabled.
    pub fn new() -> Self {
        Self {
            tenants: vec![],
            invoices: vec![],
            settings: vec![
                (SETTING_GATEWAY_PROJECT.to_string(), "netfee-test".to_string()),
                (SETTING_GATEWAY_API_KEY.to_string(), "test_api_key".to_string()),
                (SETTING_AUTO_DISCONNECT.to_string(), "true".to_string()),
            ],
        }
    }

    pub fn with_tenant(mut self, tenant: TenantProfile) -> Self {
        self.tenants.push(tenant);
        self
    }

    pub fn with_invoice(mut self, invoice: InvoiceProfile) -> Self {
        self.invoices.push(invoice);
        self
    }

    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.settings.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> (AppState, TestHandles) {
        let invoices = Arc::new(InMemoryInvoiceRepo::new());
        for invoice in self.invoices {
            invoices.seed(invoice);
        }

        let tenants = Arc::new(InMemoryTenantDirectory::with_tenants(self.tenants));
        let notifications = Arc::new(InMemoryNotificationLog::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let gateway = Arc::new(StubPaymentGateway::new());

        let settings_store = InMemorySettingsStore::new();
        for (key, value) in &self.settings {
            settings_store.set(key, value);
        }
        let settings = BillingSettings::new(Arc::new(settings_store));

        let generation_use_cases = Arc::new(InvoiceGenerationUseCases::new(
            invoices.clone(),
            tenants.clone(),
            settings.clone(),
        ));
        let reminder_use_cases = Arc::new(ReminderUseCases::new(
            invoices.clone(),
            tenants.clone(),
            notifications.clone(),
            notifier.clone(),
            settings.clone(),
        ));
        let enforcement_use_cases = Arc::new(EnforcementUseCases::new(
            invoices.clone(),
            tenants.clone(),
            notifications.clone(),
            notifier.clone(),
            settings.clone(),
        ));
        let reconciliation_use_cases = Arc::new(ReconciliationUseCases::new(
            invoices.clone(),
            tenants.clone(),
            notifications.clone(),
            notifier.clone(),
            gateway.clone(),
            settings,
        ));

        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse().unwrap(),
            database_url: String::new(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            gateway_base_url: Url::parse("https://gateway.test/api").unwrap(),
            wa_gateway_url: None,
            wa_gateway_token: None,
            generation_interval_secs: 86_400,
            reminder_interval_secs: 86_400,
            enforcement_interval_secs: 86_400,
        });

        let app_state = AppState {
            config,
            generation_use_cases,
            reminder_use_cases,
            enforcement_use_cases,
            reconciliation_use_cases,
        };

        let handles = TestHandles {
            invoices,
            tenants,
            notifications,
            notifier,
            gateway,
        };

        (app_state, handles)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
