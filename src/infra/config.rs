use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

const ONE_DAY_SECS: u64 = 86_400;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    /// Pakasir API base, overridable for staging/testing.
    pub gateway_base_url: Url,
    /// WhatsApp HTTP gateway. When unset the engine runs with a no-op
    /// notifier; everything else keeps working.
    pub wa_gateway_url: Option<Url>,
    pub wa_gateway_token: Option<SecretString>,
    /// Sweep cadences in seconds. All three default to one day.
    pub generation_interval_secs: u64,
    pub reminder_interval_secs: u64,
    pub enforcement_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let gateway_base_url: Url = get_env_default(
            "GATEWAY_BASE_URL",
            Url::parse("https://app.pakasir.com/api").unwrap(),
        );

        let wa_gateway_url: Option<Url> = std::env::var("WA_GATEWAY_URL")
            .ok()
            .and_then(|s| s.parse().ok());
        let wa_gateway_token: Option<SecretString> = std::env::var("WA_GATEWAY_TOKEN")
            .ok()
            .map(|s| SecretString::new(s.into()));

        let generation_interval_secs: u64 =
            get_env_default("GENERATION_INTERVAL_SECS", ONE_DAY_SECS);
        let reminder_interval_secs: u64 = get_env_default("REMINDER_INTERVAL_SECS", ONE_DAY_SECS);
        let enforcement_interval_secs: u64 =
            get_env_default("ENFORCEMENT_INTERVAL_SECS", ONE_DAY_SECS);

        Self {
            bind_addr,
            database_url,
            cors_origin,
            gateway_base_url,
            wa_gateway_url,
            wa_gateway_token,
            generation_interval_secs,
            reminder_interval_secs,
            enforcement_interval_secs,
        }
    }
}
