use std::sync::Arc;

use crate::{
    application::use_cases::{
        enforcement::EnforcementUseCases, invoice_generation::InvoiceGenerationUseCases,
        reconciliation::ReconciliationUseCases, reminders::ReminderUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generation_use_cases: Arc<InvoiceGenerationUseCases>,
    pub reminder_use_cases: Arc<ReminderUseCases>,
    pub enforcement_use_cases: Arc<EnforcementUseCases>,
    pub reconciliation_use_cases: Arc<ReconciliationUseCases>,
}
