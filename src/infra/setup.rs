use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::{
        ports::{
            notifier::{NoopNotificationGateway, NotificationGatewayPort},
            payment_gateway::PaymentGatewayPort,
        },
        use_cases::{
            enforcement::EnforcementUseCases,
            invoice_generation::InvoiceGenerationUseCases,
            ledger::{
                BillingSettings, InvoiceRepoTrait, NotificationLogTrait, SettingsStoreTrait,
                TenantDirectoryTrait,
            },
            reconciliation::ReconciliationUseCases,
            reminders::ReminderUseCases,
        },
    },
    infra::{
        config::AppConfig, db::init_db, pakasir_client::PakasirClient, wa_notifier::WhatsAppNotifier,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(PostgresPersistence::new(init_db(&config.database_url).await?));

    let invoice_repo = postgres_arc.clone() as Arc<dyn InvoiceRepoTrait>;
    let tenant_directory = postgres_arc.clone() as Arc<dyn TenantDirectoryTrait>;
    let notification_log = postgres_arc.clone() as Arc<dyn NotificationLogTrait>;
    let settings_store = postgres_arc.clone() as Arc<dyn SettingsStoreTrait>;
    let settings = BillingSettings::new(settings_store);

    // The notifier is an explicit optional dependency: without a configured
    // gateway URL the engine runs with a no-op sender.
    let notifier: Arc<dyn NotificationGatewayPort> = match &config.wa_gateway_url {
        Some(url) => Arc::new(WhatsAppNotifier::new(
            url.clone(),
            config.wa_gateway_token.clone(),
        )),
        None => Arc::new(NoopNotificationGateway),
    };

    let gateway: Arc<dyn PaymentGatewayPort> =
        Arc::new(PakasirClient::new(config.gateway_base_url.clone()));

    let generation_use_cases = InvoiceGenerationUseCases::new(
        invoice_repo.clone(),
        tenant_directory.clone(),
        settings.clone(),
    );

    let reminder_use_cases = ReminderUseCases::new(
        invoice_repo.clone(),
        tenant_directory.clone(),
        notification_log.clone(),
        notifier.clone(),
        settings.clone(),
    );

    let enforcement_use_cases = EnforcementUseCases::new(
        invoice_repo.clone(),
        tenant_directory.clone(),
        notification_log.clone(),
        notifier.clone(),
        settings.clone(),
    );

    let reconciliation_use_cases = ReconciliationUseCases::new(
        invoice_repo,
        tenant_directory,
        notification_log,
        notifier,
        gateway,
        settings,
    );

    Ok(AppState {
        config: Arc::new(config),
        generation_use_cases: Arc::new(generation_use_cases),
        reminder_use_cases: Arc::new(reminder_use_cases),
        enforcement_use_cases: Arc::new(enforcement_use_cases),
        reconciliation_use_cases: Arc::new(reconciliation_use_cases),
    })
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "netfee=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
