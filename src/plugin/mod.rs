//! Host-facing plugin lifecycle: info, init, deliver, reconfigure, shutdown.

use crate::config::{default_category, ConfigCategory, PLUGIN_NAME};
use crate::services::DeliveryAdapter;
use crate::transport::Transport;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Plugin interface version understood by the host.
pub const INTERFACE_VERSION: &str = "1.0.0";

/// Plugin type reported to the host.
pub const PLUGIN_TYPE: &str = "notificationDelivery";

/// Static description the host reads before loading the plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInformation {
    pub name: &'static str,
    pub version: &'static str,
    pub flags: u32,
    #[serde(rename = "type")]
    pub plugin_type: &'static str,
    pub interface_version: &'static str,
    /// Default configuration category.
    pub config: ConfigCategory,
}

pub fn plugin_info() -> PluginInformation {
    PluginInformation {
        name: PLUGIN_NAME,
        version: env!("CARGO_PKG_VERSION"),
        flags: 0,
        plugin_type: PLUGIN_TYPE,
        interface_version: INTERFACE_VERSION,
        config: default_category(),
    }
}

/// Plugin handle returned to the host by [`Plugin::init`].
pub struct Plugin {
    adapter: DeliveryAdapter,
}

impl Plugin {
    pub fn init(config: &ConfigCategory) -> Self {
        Self::from_adapter(DeliveryAdapter::new(config))
    }

    pub fn with_transport(config: &ConfigCategory, transport: Arc<dyn Transport>) -> Self {
        Self::from_adapter(DeliveryAdapter::with_transport(config, transport))
    }

    fn from_adapter(adapter: DeliveryAdapter) -> Self {
        info!(enabled = adapter.is_enabled(), "blynk plugin initialised");
        Self { adapter }
    }

    /// Deliver a notification. Failures are logged and reported as `false`.
    pub fn deliver(
        &self,
        delivery_name: &str,
        notification_name: &str,
        trigger_reason: &str,
        message: &str,
    ) -> bool {
        debug!(
            delivery = %delivery_name,
            notification = %notification_name,
            trigger_reason = %trigger_reason,
            message = %message,
            "blynk plugin deliver"
        );
        self.adapter.notify(notification_name, trigger_reason, message)
    }

    pub fn reconfigure(&self, new_config: &str) {
        debug!("blynk plugin reconfigure");
        if let Err(e) = self.adapter.reconfigure(new_config) {
            error!(error = %e, "blynk reconfigure rejected, keeping previous configuration");
        }
    }

    pub fn adapter(&self) -> &DeliveryAdapter {
        &self.adapter
    }

    pub fn shutdown(self) {
        debug!("blynk plugin shutdown");
    }
}
