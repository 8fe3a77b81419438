pub mod billing_period;
pub mod enforcement;
pub mod invoice_generation;
pub mod ledger;
pub mod reconciliation;
pub mod reminders;
