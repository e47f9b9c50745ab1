//! Time-bounded undo queue for destructive actions.
//!
//! # Responsibility
//! - Hold copies of removed entities for the grace window.
//! - Reverse a staged action through the entity store on explicit undo.
//!
//! # Invariants
//! - At most one live entry per subject id; re-staging replaces the entry
//!   and its deadline.
//! - Expiry never mutates the store; the destructive mutation already
//!   happened at stage time.
//! - Undo after the window, or for an unknown subject, is a silent no-op.

use crate::clock::EpochMs;
use crate::model::list::{List, ListId};
use crate::model::task::Task;
use crate::store::EntityStore;
use log::{debug, warn};

/// Default grace window in milliseconds.
pub const DEFAULT_UNDO_GRACE_MS: EpochMs = 6_000;

/// Reversible destructive action with everything needed to undo it.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// Task deleted from the active or archive sequence.
    TaskDeleted {
        list_id: ListId,
        task: Task,
        index: usize,
        from_archive: bool,
    },
    /// Task moved from the active sequence into the archive.
    TaskArchived {
        list_id: ListId,
        task: Task,
        index: usize,
    },
    /// List removed together with both buckets.
    ListDeleted {
        list: List,
        tasks: Vec<Task>,
        archive: Vec<Task>,
    },
}

impl UndoAction {
    /// Stable identity used to match undo requests and to collapse
    /// repeated staging of the same subject.
    pub fn subject_id(&self) -> String {
        match self {
            Self::TaskDeleted { task, .. } | Self::TaskArchived { task, .. } => task.id.to_string(),
            Self::ListDeleted { list, .. } => list.id.clone(),
        }
    }
}

/// One staged entry awaiting undo or expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub action: UndoAction,
    pub staged_at: EpochMs,
    pub expires_at: EpochMs,
}

/// Queue of staged destructive actions.
///
/// Deadlines are data rather than timer handles: the facade computes the
/// next expiry for its single wakeup, and cancellation is just entry
/// removal.
#[derive(Debug, Default)]
pub struct UndoQueue {
    entries: Vec<UndoEntry>,
}

impl UndoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages one action for the given grace window.
    pub fn stage(&mut self, action: UndoAction, now: EpochMs, grace_ms: EpochMs) {
        let subject = action.subject_id();
        self.entries
            .retain(|entry| entry.action.subject_id() != subject);
        debug!("event=undo_stage module=undo status=ok subject={subject} grace_ms={grace_ms}");
        self.entries.push(UndoEntry {
            action,
            staged_at: now,
            expires_at: now + grace_ms,
        });
    }

    /// Reverses the staged action for `subject_id` while its window is
    /// open. Returns whether a restore happened.
    pub fn undo(&mut self, subject_id: &str, now: EpochMs, store: &mut EntityStore) -> bool {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.action.subject_id() == subject_id && now < entry.expires_at);
        let Some(position) = position else {
            // Already expired or never staged; a benign race, not an error.
            debug!("event=undo_miss module=undo status=ok subject={subject_id}");
            return false;
        };
        let entry = self.entries.remove(position);
        apply_restore(entry.action, store)
    }

    /// Drops entries whose window elapsed, returning them so callers can
    /// tear down their visible undo affordances.
    pub fn purge_expired(&mut self, now: EpochMs) -> Vec<UndoEntry> {
        let (expired, live): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| now >= entry.expires_at);
        self.entries = live;
        for entry in &expired {
            debug!(
                "event=undo_purge module=undo status=ok subject={}",
                entry.action.subject_id()
            );
        }
        expired
    }

    /// Entries still inside their grace window.
    pub fn pending(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// Earliest deadline among live entries.
    pub fn next_expiry(&self) -> Option<EpochMs> {
        self.entries.iter().map(|entry| entry.expires_at).min()
    }
}

/// Applies one reversal through the entity store.
///
/// Positions are re-resolved defensively: indices clamp to the current
/// length and archived tasks are located by id rather than by the index
/// captured at stage time. A reversal whose list has since vanished is a
/// logged no-op.
fn apply_restore(action: UndoAction, store: &mut EntityStore) -> bool {
    match action {
        UndoAction::TaskDeleted {
            list_id,
            task,
            index,
            from_archive,
        } => match store.restore_task(&list_id, task, index, from_archive) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=undo_restore module=undo status=error list_id={list_id} error={err}");
                false
            }
        },
        UndoAction::TaskArchived {
            list_id,
            task,
            index,
        } => {
            let Some(archive_index) = store.position_of(&list_id, task.id, true) else {
                warn!(
                    "event=undo_restore module=undo status=error list_id={list_id} error=archived_task_missing"
                );
                return false;
            };
            let Ok(mut restored) = store.remove_task(&list_id, archive_index, true) else {
                return false;
            };
            restored.archived = false;
            match store.restore_task(&list_id, restored, index, false) {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        "event=undo_restore module=undo status=error list_id={list_id} error={err}"
                    );
                    false
                }
            }
        }
        UndoAction::ListDeleted {
            list,
            tasks,
            archive,
        } => {
            store.restore_list(list, tasks, archive);
            true
        }
    }
}
