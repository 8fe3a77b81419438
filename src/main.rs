use std::time::Duration;

use dotenvy::dotenv;
use tracing::info;

use netfee::infra::{
    app::create_app,
    scheduler::{BillingScheduler, SchedulerIntervals},
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;

    let mut scheduler = BillingScheduler::start(
        app_state.generation_use_cases.clone(),
        app_state.reminder_use_cases.clone(),
        app_state.enforcement_use_cases.clone(),
        SchedulerIntervals {
            generation: Duration::from_secs(app_state.config.generation_interval_secs),
            reminders: Duration::from_secs(app_state.config.reminder_interval_secs),
            enforcement: Duration::from_secs(app_state.config.enforcement_interval_secs),
        },
    );

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("Shutdown signal received");
}
