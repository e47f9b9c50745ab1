//! Delivery collaborator contract for user-facing notifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a delivery collaborator can refuse an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The user denied notification permission.
    PermissionDenied,
    /// The platform offers no delivery channel.
    Unsupported,
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Unsupported => write!(f, "notification delivery unsupported"),
        }
    }
}

impl Error for DeliveryError {}

/// Outward notification channel (OS notifier, tray badge, web push).
///
/// Requesting permission is the collaborator's business; the core only
/// decides *that* an event should be delivered. Failure here never loses
/// the event; the sink records it as a fallback entry instead.
pub trait NotificationDelivery {
    fn deliver(&mut self, title: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Delivery stub that accepts everything without side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDelivery;

impl NotificationDelivery for NullDelivery {
    fn deliver(&mut self, _title: &str, _body: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}
