//! Wall-clock abstraction for due-date math.
//!
//! # Responsibility
//! - Provide the single time source consulted by scheduling, undo windows
//!   and completion stamps.
//! - Let tests drive time deterministically.
//!
//! # Invariants
//! - All timestamps are Unix epoch milliseconds.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix epoch milliseconds.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EpochMs = i64;

/// Time source for every due-date computation.
pub trait Clock {
    fn now(&self) -> EpochMs;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMs {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as EpochMs,
            // A clock set before the epoch clamps to zero instead of
            // panicking inside time math.
            Err(_) => 0,
        }
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test keeps one handle and
/// advances time while the tracker holds another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<EpochMs>>,
}

impl ManualClock {
    pub fn new(start: EpochMs) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: EpochMs) {
        self.now.set(now);
    }

    pub fn advance(&self, delta_ms: EpochMs) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMs {
        self.now.get()
    }
}
