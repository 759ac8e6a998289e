//! Out-of-band message delivery.
//!
//! The sender only sees [`Deliver`]: one call per recipient, success carries a
//! short status detail (for Messages.app that is "iMessage" or "SMS").

mod applescript;
mod error;

pub use applescript::{AppleScriptDelivery, DEFAULT_SEND_TIMEOUT_SECS};
pub use error::DeliveryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub detail: String,
}

impl DeliveryStatus {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

pub trait Deliver {
    fn deliver(&self, handle: &str, message: &str) -> Result<DeliveryStatus, DeliveryError>;
}

impl<T: Deliver + ?Sized> Deliver for &T {
    fn deliver(&self, handle: &str, message: &str) -> Result<DeliveryStatus, DeliveryError> {
        (**self).deliver(handle, message)
    }
}

/// Accepts every message without sending anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDelivery;

impl Deliver for DryRunDelivery {
    fn deliver(&self, handle: &str, _message: &str) -> Result<DeliveryStatus, DeliveryError> {
        tracing::debug!(handle, "dry run: message not sent");
        Ok(DeliveryStatus::new("dry run"))
    }
}
