//! Task domain record and text normalization.
//!
//! # Responsibility
//! - Define the canonical task shape shared by the active and archive
//!   sequences.
//! - Normalize user-entered text before validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `done == true` implies `completed_at` is set.
//! - Archived tasks never participate in due-date scheduling.

use crate::clock::EpochMs;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Maximum characters allowed in task text after normalization.
pub const MAX_TASK_TEXT_CHARS: usize = 100;

/// Effort category chosen at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Small one-shot item.
    Quick,
    /// Recurring daily item.
    Daily,
    /// Multi-step item; may carry free-text subtasks.
    LongTerm,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub kind: TaskKind,
    /// Absent means the task is never scheduled and never expires.
    pub due_date: Option<EpochMs>,
    /// Free-text breakdown, meaningful for `TaskKind::LongTerm` only.
    pub subtasks: Option<String>,
    pub done: bool,
    pub archived: bool,
    pub created: EpochMs,
    pub completed_at: Option<EpochMs>,
}

/// User input for creating one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub kind: TaskKind,
    pub due_date: Option<EpochMs>,
    pub subtasks: Option<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TaskKind::Quick,
            due_date: None,
            subtasks: None,
        }
    }

    pub fn due(mut self, due_date: EpochMs) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn subtasks(mut self, subtasks: impl Into<String>) -> Self {
        self.subtasks = Some(subtasks.into());
        self
    }
}

impl Task {
    /// Builds a task from draft input whose text is already normalized and
    /// validated; callers go through `EntityStore::add_task`.
    pub(crate) fn from_draft(draft: TaskDraft, created: EpochMs) -> Self {
        let subtasks = match draft.kind {
            TaskKind::LongTerm => draft.subtasks,
            _ => None,
        };
        Self {
            id: Uuid::new_v4(),
            text: draft.text,
            kind: draft.kind,
            due_date: draft.due_date,
            subtasks,
            done: false,
            archived: false,
            created,
            completed_at: None,
        }
    }

    /// Returns whether this task's deadline passed without completion.
    ///
    /// Done and archived tasks never expire.
    pub fn is_expired(&self, now: EpochMs) -> bool {
        match self.due_date {
            Some(due) => !self.done && !self.archived && due < now,
            None => false,
        }
    }
}

/// Collapses newlines to spaces and trims surrounding whitespace.
pub fn normalize_task_text(value: &str) -> String {
    value.replace(['\n', '\r'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{normalize_task_text, Task, TaskDraft, TaskKind};

    #[test]
    fn normalize_collapses_newlines_and_trims() {
        assert_eq!(normalize_task_text("  pay\nbills\r "), "pay bills");
    }

    #[test]
    fn subtasks_are_dropped_for_non_longterm_kinds() {
        let draft = TaskDraft::new("tidy desk").subtasks("drawer, shelf");
        let task = Task::from_draft(draft, 1_000);
        assert_eq!(task.subtasks, None);

        let draft = TaskDraft::new("renovate")
            .kind(TaskKind::LongTerm)
            .subtasks("plan, paint");
        let task = Task::from_draft(draft, 1_000);
        assert_eq!(task.subtasks.as_deref(), Some("plan, paint"));
    }

    #[test]
    fn expiry_requires_a_due_date_and_ignores_done_tasks() {
        let mut task = Task::from_draft(TaskDraft::new("call bank").due(2_000), 1_000);
        assert!(!task.is_expired(1_500));
        assert!(task.is_expired(2_500));

        task.done = true;
        assert!(!task.is_expired(2_500));

        let undated = Task::from_draft(TaskDraft::new("someday"), 1_000);
        assert!(!undated.is_expired(i64::MAX));
    }
}
