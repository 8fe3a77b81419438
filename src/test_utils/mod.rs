//! In-memory mocks, stubs, and factories for use-case and route tests.

pub mod app_state_builder;
pub mod billing_mocks;
pub mod factories;
pub mod gateway_mocks;

pub use app_state_builder::{TestAppStateBuilder, TestHandles};
pub use billing_mocks::{
    InMemoryInvoiceRepo, InMemoryNotificationLog, InMemorySettingsStore, InMemoryTenantDirectory,
};
pub use factories::{create_test_invoice, create_test_tenant};
pub use gateway_mocks::{RecordingNotifier, SentKind, SentNotification, StubPaymentGateway};
