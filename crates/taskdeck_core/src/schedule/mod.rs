//! Due-date reminder and expiration scheduling.
//!
//! # Responsibility
//! - Evaluate every pending task against the clock and emit each
//!   reminder/expiration exactly once.
//! - Compute the next wakeup so the host arms a single timer regardless of
//!   task count.
//!
//! # Invariants
//! - At most one reminder and one expiration per `(list, task, due date)`,
//!   ever, across restarts.
//! - A pass re-reads current store state; it never trusts a snapshot
//!   captured when the timer was armed.

mod fired_keys;
mod scheduler;

pub use fired_keys::{DueEventKind, FiredEventKey, FiredKeySet};
pub use scheduler::{
    format_duration, DueEvent, ReminderScheduler, ScheduleState, REMINDER_MIN_LEAD_MS,
};
