//! Data models for trigger payloads and outbound requests.

pub mod request;
pub mod trigger;

pub use request::*;
pub use trigger::*;
