//! Persisted deduplication set for emitted schedule events.

use crate::clock::EpochMs;
use crate::model::list::ListId;
use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Event category covered by deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueEventKind {
    Reminder,
    Expired,
}

/// Identity of one emitted event.
///
/// The due date is part of the key, so editing a deadline produces a fresh
/// key and the task may legitimately remind again for its new deadline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiredEventKey {
    pub list_id: ListId,
    pub task_id: TaskId,
    pub due_date: EpochMs,
    pub kind: DueEventKind,
}

/// Set of already-emitted event keys, persisted across restarts.
///
/// Keys of completed, archived or deleted tasks are harmless to retain;
/// those tasks are excluded from evaluation anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiredKeySet {
    keys: HashSet<FiredEventKey>,
}

impl FiredKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &FiredEventKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `true` when the key was newly inserted.
    pub fn insert(&mut self, key: FiredEventKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DueEventKind, FiredEventKey, FiredKeySet};
    use uuid::Uuid;

    fn key(due_date: i64, kind: DueEventKind) -> FiredEventKey {
        FiredEventKey {
            list_id: "groceries-0a1b2c3d".to_string(),
            task_id: Uuid::nil(),
            due_date,
            kind,
        }
    }

    #[test]
    fn insert_reports_first_occurrence_only() {
        let mut set = FiredKeySet::new();
        assert!(set.insert(key(1_000, DueEventKind::Reminder)));
        assert!(!set.insert(key(1_000, DueEventKind::Reminder)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn kind_and_due_date_distinguish_keys() {
        let mut set = FiredKeySet::new();
        set.insert(key(1_000, DueEventKind::Reminder));
        assert!(!set.contains(&key(1_000, DueEventKind::Expired)));
        assert!(!set.contains(&key(2_000, DueEventKind::Reminder)));
    }

    #[test]
    fn set_round_trips_through_json() {
        let mut set = FiredKeySet::new();
        set.insert(key(1_000, DueEventKind::Reminder));
        set.insert(key(1_000, DueEventKind::Expired));

        let payload = serde_json::to_vec(&set).unwrap();
        let restored: FiredKeySet = serde_json::from_slice(&payload).unwrap();
        assert_eq!(restored, set);
    }
}
