//! Outbound HTTP transport for Blynk deliveries.

pub mod http;

pub use http::HttpTransport;

use crate::error::TransportError;
use crate::models::DeliveryRequest;

/// Sends a delivery request and returns the HTTP status code.
pub trait Transport: Send + Sync {
    fn get(&self, request: &DeliveryRequest) -> Result<u16, TransportError>;
}
