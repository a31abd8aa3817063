//! Plugin configuration: the host's configuration category and the adapter's settings.

use crate::error::ConfigLoadError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Name the plugin registers under with the host.
pub const PLUGIN_NAME: &str = "Blynk";

/// Default Blynk REST API url prefix.
pub const DEFAULT_API_URL: &str = "http://blynk-cloud.com";

/// A host configuration category: item name -> item description.
///
/// Items are objects such as `{"type": "string", "default": "", "value": "abc"}`.
/// Bare strings, numbers and booleans are accepted as the item's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigCategory {
    items: Map<String, Value>,
}

impl ConfigCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a category from its JSON form. The top level must be an object.
    pub fn parse(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Current value of an item: its `value`, else its `default`, else empty.
    pub fn get_value(&self, name: &str) -> String {
        match self.items.get(name) {
            Some(Value::Object(item)) => item
                .get("value")
                .or_else(|| item.get("default"))
                .map(scalar_to_string)
                .unwrap_or_default(),
            Some(other) => scalar_to_string(other),
            None => String::new(),
        }
    }

    /// Set an item's value, creating a plain string item if it does not exist.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        let value = Value::String(value.into());
        match self.items.get_mut(name) {
            Some(Value::Object(item)) => {
                item.insert("value".to_string(), value);
            }
            _ => {
                self.items.insert(name.to_string(), json!({ "value": value }));
            }
        }
    }

    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_value(name, value);
        self
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.items.clone()).to_string()
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// The default configuration category advertised to the host.
pub fn default_category() -> ConfigCategory {
    let items = json!({
        "plugin": {
            "description": "Blynk notification delivery plugin",
            "type": "string",
            "default": PLUGIN_NAME,
            "readonly": "true"
        },
        "token": {
            "description": "The Blynk REST API token",
            "type": "string",
            "default": "",
            "order": "1",
            "displayName": "REST API token"
        },
        "pin": {
            "description": "The Blynk Pin for device or Virtual Pin",
            "type": "string",
            "default": "",
            "order": "2",
            "displayName": "Device Pin/Vpin"
        },
        "api_url": {
            "description": "Blynk REST API url prefix.",
            "type": "string",
            "default": DEFAULT_API_URL,
            "order": "3",
            "displayName": "REST API url prefix"
        },
        "enable": {
            "description": "A switch that can be used to enable or disable execution of the Blynk notification plugin.",
            "type": "boolean",
            "default": "false",
            "displayName": "Enabled"
        }
    });
    match items {
        Value::Object(items) => ConfigCategory { items },
        _ => ConfigCategory::new(),
    }
}

/// Adapter settings taken from a configuration category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Blynk auth token, inserted into the request path.
    pub token: String,
    /// Device pin or virtual pin (e.g. `V1`).
    pub pin: String,
    /// REST API url prefix (e.g. `http://blynk-cloud.com`).
    pub api_url: String,
    /// Effective enable state; false whenever token, pin or url is empty.
    pub enabled: bool,
}

impl DeliveryConfig {
    pub fn from_category(category: &ConfigCategory) -> Self {
        let token = category.get_value("token");
        let pin = category.get_value("pin");
        let api_url = category.get_value("api_url");
        let enabled = !token.is_empty()
            && !pin.is_empty()
            && !api_url.is_empty()
            && enable_flag(&category.get_value("enable"));
        Self {
            token,
            pin,
            api_url,
            enabled,
        }
    }
}

/// Only the spellings `true` and `True` switch the plugin on.
pub fn enable_flag(value: &str) -> bool {
    value == "true" || value == "True"
}

/// Settings loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Default category with `BLYNK_*` overrides applied.
    pub category: ConfigCategory,
}

impl EnvSettings {
    /// Load from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Self {
        let mut category = default_category();
        for (var, item) in [
            ("BLYNK_TOKEN", "token"),
            ("BLYNK_PIN", "pin"),
            ("BLYNK_API_URL", "api_url"),
            ("BLYNK_ENABLE", "enable"),
        ] {
            if let Ok(value) = std::env::var(var) {
                category.set_value(item, value);
            }
        }
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            log_level,
            category,
        }
    }
}
