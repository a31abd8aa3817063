//! Blocking `reqwest` transport. A new client is built for every request.

use super::Transport;
use crate::error::TransportError;
use crate::models::DeliveryRequest;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &DeliveryRequest) -> Result<u16, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(request.connect_timeout)
            .timeout(request.timeout)
            .no_proxy()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        let url = request.url();
        let response = client.get(&url).send().map_err(classify)?;
        let status = response.status().as_u16();
        debug!(url = %url, status, "blynk response");
        Ok(status)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        if err.is_connect() {
            TransportError::ConnectTimeout
        } else {
            TransportError::ResponseTimeout
        }
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::Client(err.to_string())
    } else {
        TransportError::Protocol(err.to_string())
    }
}
