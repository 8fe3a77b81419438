use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

use crate::application::use_cases::{
    billing_period::BillingPeriod, enforcement::EnforcementUseCases,
    invoice_generation::InvoiceGenerationUseCases, reminders::ReminderUseCases,
};

/// Timer-driven side of the engine: three independent fixed-interval loops
/// for invoice generation, the reminder sweep, and the overdue sweep.
///
/// The scheduler owns its task handles explicitly. Construct one per process,
/// `start()` it next to the HTTP server, `stop()` it on shutdown. Each loop
/// runs once immediately on start, then on its interval. The sweeps share the
/// use-case code with the manual HTTP triggers, so an overlap between a timer
/// firing and a manual run is harmless by the same idempotency guarantees.
pub struct BillingScheduler {
    handles: Vec<JoinHandle<()>>,
}

pub struct SchedulerIntervals {
    pub generation: Duration,
    pub reminders: Duration,
    pub enforcement: Duration,
}

impl BillingScheduler {
    pub fn start(
        generation: Arc<InvoiceGenerationUseCases>,
        reminders: Arc<ReminderUseCases>,
        enforcement: Arc<EnforcementUseCases>,
        intervals: SchedulerIntervals,
    ) -> Self {
        let SchedulerIntervals {
            generation: generation_every,
            reminders: reminders_every,
            enforcement: enforcement_every,
        } = intervals;

        info!(
            generation_secs = generation_every.as_secs(),
            reminder_secs = reminders_every.as_secs(),
            enforcement_secs = enforcement_every.as_secs(),
            "Billing scheduler started"
        );

        let generation_handle = tokio::spawn(async move {
            let mut ticker = interval(generation_every);
            loop {
                ticker.tick().await;
                let period = BillingPeriod::containing(Utc::now().date_naive());
                if let Err(e) = generation.generate_for_period(period).await {
                    error!(error = %e, "Scheduled invoice generation failed");
                }
            }
        });

        let reminder_handle = tokio::spawn(async move {
            let mut ticker = interval(reminders_every);
            loop {
                ticker.tick().await;
                if let Err(e) = reminders.run_reminders(Utc::now().date_naive()).await {
                    error!(error = %e, "Scheduled reminder sweep failed");
                }
            }
        });

        let enforcement_handle = tokio::spawn(async move {
            let mut ticker = interval(enforcement_every);
            loop {
                ticker.tick().await;
                if let Err(e) = enforcement.run_enforcement(Utc::now().date_naive()).await {
                    error!(error = %e, "Scheduled enforcement sweep failed");
                }
            }
        });

        Self {
            handles: vec![generation_handle, reminder_handle, enforcement_handle],
        }
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }

    /// Abort the timer tasks. In-flight webhook reconciliations are not
    /// affected; they run on the HTTP server's request tasks.
    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Billing scheduler stopped");
    }
}

impl Drop for BillingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ledger::BillingSettings;
    use crate::test_utils::{
        InMemoryInvoiceRepo, InMemoryNotificationLog, InMemorySettingsStore,
        InMemoryTenantDirectory, RecordingNotifier, create_test_tenant,
    };

    #[tokio::test]
    async fn runs_generation_on_start_and_stops_cleanly() {
        let invoices = Arc::new(InMemoryInvoiceRepo::new());
        let tenants = Arc::new(InMemoryTenantDirectory::with_tenants(vec![
            create_test_tenant(|_| {}),
        ]));
        let notifications = Arc::new(InMemoryNotificationLog::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let settings = BillingSettings::new(Arc::new(InMemorySettingsStore::new()));

        let generation = Arc::new(InvoiceGenerationUseCases::new(
            invoices.clone(),
            tenants.clone(),
            settings.clone(),
        ));
        let reminders = Arc::new(ReminderUseCases::new(
            invoices.clone(),
            tenants.clone(),
            notifications.clone(),
            notifier.clone(),
            settings.clone(),
        ));
        let enforcement = Arc::new(EnforcementUseCases::new(
            invoices.clone(),
            tenants.clone(),
            notifications,
            notifier,
            settings,
        ));

        let mut scheduler = BillingScheduler::start(
            generation,
            reminders,
            enforcement,
            SchedulerIntervals {
                generation: Duration::from_secs(3600),
                reminders: Duration::from_secs(3600),
                enforcement: Duration::from_secs(3600),
            },
        );

        // The first tick fires immediately; give the tasks a moment to run.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(scheduler.is_running());
        assert_eq!(invoices.all().len(), 1);

        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!scheduler.is_running());
    }
}
