//! Blynk REST endpoint parsing and the outbound GET request.

use crate::config::DeliveryConfig;
use crate::error::{AppResult, DeliveryError};
use crate::models::trigger::TriggerReason;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Connect and overall timeout for a delivery.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport protocol. Anything other than `https` is sent as plain HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn from_name(name: &str) -> Self {
        if name == "https" {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components of the configured api url. Recomputed per delivery, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEndpoint {
    pub scheme: Scheme,
    /// `host` or `host:port` when the url names a port.
    pub host_with_port: String,
    /// Url path, `/` when the url has none.
    pub path: String,
}

impl ParsedEndpoint {
    pub fn parse(api_url: &str) -> AppResult<Self> {
        let invalid = |reason: String| DeliveryError::InvalidUrl {
            url: api_url.to_string(),
            reason,
        };
        let url = Url::parse(api_url).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let host_with_port = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let path = match url.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        Ok(Self {
            scheme: Scheme::from_name(url.scheme()),
            host_with_port,
            path,
        })
    }

    /// `{path}{token}/update/{pin}?value=`, token and pin percent-encoded.
    pub fn update_path(&self, token: &str, pin: &str) -> String {
        format!(
            "{}{}/update/{}?value=",
            self.path,
            urlencoding::encode(token),
            urlencoding::encode(pin)
        )
    }
}

/// One GET against the Blynk pin update API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub scheme: Scheme,
    pub host_with_port: String,
    /// Path and query, already percent-encoded; sent exactly as logged.
    pub path: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl DeliveryRequest {
    /// Build the pin update request. Reason and notification name are
    /// percent-encoded so the path survives url parsing byte for byte.
    pub fn build(
        config: &DeliveryConfig,
        reason: &TriggerReason,
        notification_name: &str,
    ) -> AppResult<Self> {
        let endpoint = ParsedEndpoint::parse(&config.api_url)?;
        let mut path = endpoint.update_path(&config.token, &config.pin);
        path.push_str(reason.pin_value());
        path.push_str("&reason=");
        path.push_str(&urlencoding::encode(reason.as_str()));
        path.push_str("&notification=");
        path.push_str(&urlencoding::encode(notification_name));

        Ok(Self {
            scheme: endpoint.scheme,
            host_with_port: endpoint.host_with_port,
            path,
            connect_timeout: REQUEST_TIMEOUT,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host_with_port, self.path)
    }
}
