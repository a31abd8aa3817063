//! Blynk notification delivery plugin.
//!
//! Turns a triggered/cleared notification into a Blynk REST pin update:
//! `GET {api_url}{token}/update/{pin}?value={1|0}&reason=..&notification=..`.

pub mod config;
pub mod error;
pub mod models;
pub mod plugin;
pub mod services;
pub mod telemetry;
pub mod transport;

pub use config::{ConfigCategory, DeliveryConfig, EnvSettings};
pub use error::{AppResult, ConfigLoadError, DeliveryError, TransportError};
pub use plugin::{plugin_info, Plugin, PluginInformation};
pub use services::DeliveryAdapter;
pub use transport::{HttpTransport, Transport};

/// Build a plugin from `.env` / environment variables, installing logging
/// unless the host already has a subscriber.
pub fn plugin_from_env() -> Plugin {
    dotenvy::dotenv().ok();
    let settings = EnvSettings::from_env();
    if let Err(e) = telemetry::init_tracing(&settings.log_level) {
        tracing::debug!(error = %e, "tracing not initialised");
    }
    Plugin::init(&settings.category)
}
