//! Core domain logic for TaskDeck, a client-local personal task tracker.
//! This crate is the single source of truth for list/task state, due-date
//! scheduling and undo semantics; rendering and OS notification delivery
//! live outside.

pub mod clock;
pub mod export;
pub mod logging;
pub mod model;
pub mod notify;
pub mod persist;
pub mod schedule;
pub mod service;
pub mod store;
pub mod undo;

pub use clock::{Clock, EpochMs, ManualClock, SystemClock};
pub use export::{build_snapshot, ExportRenderer, ExportRow, ExportSnapshot, ExportStatus, ListExport};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::list::{List, ListId, MAX_LIST_NAME_CHARS};
pub use model::notification::{Notification, NotificationKind};
pub use model::task::{Task, TaskDraft, TaskId, TaskKind, MAX_TASK_TEXT_CHARS};
pub use notify::{
    DeliveryError, NotificationDelivery, NotificationSink, NullDelivery, NOTIFICATION_CAP,
};
pub use persist::{
    MemoryStorage, PersistError, PersistenceAdapter, SaveReport, SqliteStorage, Storage,
    StorageError, FIRED_KEYS_KEY, SNAPSHOT_KEY, STORAGE_BUDGET_BYTES,
};
pub use schedule::{
    DueEvent, DueEventKind, FiredEventKey, FiredKeySet, ReminderScheduler, ScheduleState,
    REMINDER_MIN_LEAD_MS,
};
pub use service::tracker_service::{TrackerConfig, TrackerService};
pub use store::{EntityStore, IndexError, StoreError, StoreState, ValidationError};
pub use undo::{UndoAction, UndoEntry, UndoQueue, DEFAULT_UNDO_GRACE_MS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
