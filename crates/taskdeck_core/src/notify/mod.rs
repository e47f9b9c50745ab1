//! Notification log gateway and delivery collaborator contract.
//!
//! # Responsibility
//! - Append notification records newest-first and enforce the retention
//!   cap.
//! - Forward events to the outward delivery channel without ever losing
//!   one.
//!
//! # Invariants
//! - The log is append-only except for the explicit bulk clear.
//! - Append goes through the sink only: the scheduler, direct
//!   task-completion events and the persistence degradation path.

mod delivery;
mod sink;

pub use delivery::{DeliveryError, NotificationDelivery, NullDelivery};
pub use sink::{NotificationSink, NOTIFICATION_CAP};
