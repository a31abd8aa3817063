//! Delivery logic: configuration handling and notification forwarding.

pub mod delivery;

pub use delivery::DeliveryAdapter;
