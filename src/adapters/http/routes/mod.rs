use axum::Router;

use crate::adapters::http::app_state::AppState;

pub mod billing;
pub mod gateway;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/billing", billing::router())
        .nest("/gateway", gateway::router())
}
