//! Blynk delivery: lock-guarded configuration and one GET per notification.

use crate::config::{ConfigCategory, DeliveryConfig};
use crate::error::{AppResult, ConfigLoadError, DeliveryError};
use crate::models::{DeliveryRequest, TriggerPayload};
use crate::transport::{HttpTransport, Transport};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Forwards notifications to a Blynk pin.
///
/// Configuration is read under the lock and copied out before any network
/// I/O, so concurrent deliveries never block each other and a reconfigure
/// never affects a delivery already in flight.
pub struct DeliveryAdapter {
    config: Mutex<DeliveryConfig>,
    transport: Arc<dyn Transport>,
}

impl DeliveryAdapter {
    pub fn new(category: &ConfigCategory) -> Self {
        Self::with_transport(category, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(category: &ConfigCategory, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Mutex::new(DeliveryConfig::from_category(category)),
            transport,
        }
    }

    /// Replace the whole configuration from a category.
    pub fn configure(&self, category: &ConfigCategory) {
        let config = DeliveryConfig::from_category(category);
        *self.lock() = config;
    }

    /// Replace the configuration from a category JSON document.
    /// On a parse error the previous configuration stays in place.
    pub fn reconfigure(&self, new_config: &str) -> Result<(), ConfigLoadError> {
        let category = ConfigCategory::parse(new_config)?;
        self.configure(&category);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> DeliveryConfig {
        self.lock().clone()
    }

    /// Deliver one notification. Returns true only when Blynk answered 200.
    pub fn notify(&self, notification_name: &str, trigger_reason: &str, _message: &str) -> bool {
        match self.try_notify(notification_name, trigger_reason) {
            Ok(()) => {
                info!(notification = %notification_name, "blynk notification delivered");
                true
            }
            Err(DeliveryError::Disabled) => {
                debug!(notification = %notification_name, "blynk delivery disabled, skipping");
                false
            }
            Err(e) => {
                error!(notification = %notification_name, error = %e, "blynk delivery failed");
                false
            }
        }
    }

    pub fn try_notify(&self, notification_name: &str, trigger_reason: &str) -> AppResult<()> {
        let config = self.snapshot().ok_or(DeliveryError::Disabled)?;

        let trigger = TriggerPayload::parse(trigger_reason)?;
        let request = DeliveryRequest::build(&config, &trigger.reason, notification_name)?;
        let url = request.url();
        debug!(url = %url, "delivering blynk message");

        let status = self
            .transport
            .get(&request)
            .map_err(|source| DeliveryError::Transport {
                url: url.clone(),
                source,
            })?;
        if status != 200 {
            return Err(DeliveryError::UnexpectedStatus { url, status });
        }
        Ok(())
    }

    /// Enabled configuration, copied out so the lock is released before I/O.
    fn snapshot(&self) -> Option<DeliveryConfig> {
        let config = self.lock();
        config.enabled.then(|| config.clone())
    }

    fn lock(&self) -> MutexGuard<'_, DeliveryConfig> {
        // Configuration is replaced whole, so a poisoned value is still consistent.
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
