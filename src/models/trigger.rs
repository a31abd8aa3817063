//! Trigger reason payload sent by the notification service with each delivery.

use crate::error::{AppResult, DeliveryError};
use serde_json::Value;

/// Why the notification fired. Blynk pins are driven to 1 on trigger and 0 on clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    Triggered,
    Cleared,
    /// Any other reason is forwarded without a pin value.
    Other(String),
}

impl TriggerReason {
    pub fn from_name(name: &str) -> Self {
        match name {
            "triggered" => TriggerReason::Triggered,
            "cleared" => TriggerReason::Cleared,
            other => TriggerReason::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TriggerReason::Triggered => "triggered",
            TriggerReason::Cleared => "cleared",
            TriggerReason::Other(name) => name,
        }
    }

    /// Value written to the pin; empty for reasons that do not map to on/off.
    pub fn pin_value(&self) -> &'static str {
        match self {
            TriggerReason::Triggered => "1",
            TriggerReason::Cleared => "0",
            TriggerReason::Other(_) => "",
        }
    }
}

/// `{"reason": "..."}` as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPayload {
    pub reason: TriggerReason,
}

impl TriggerPayload {
    /// Parse the raw JSON. Malformed JSON and a missing or non-string `reason`
    /// are both errors; extra fields are ignored.
    pub fn parse(payload: &str) -> AppResult<Self> {
        let doc: Value =
            serde_json::from_str(payload).map_err(|source| DeliveryError::TriggerParse {
                payload: payload.to_string(),
                source,
            })?;
        let reason = doc
            .get("reason")
            .and_then(Value::as_str)
            .ok_or_else(|| DeliveryError::MissingReason {
                payload: payload.to_string(),
            })?;
        Ok(Self {
            reason: TriggerReason::from_name(reason),
        })
    }
}
