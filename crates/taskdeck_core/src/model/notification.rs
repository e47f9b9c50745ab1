//! Notification log records.

use crate::clock::EpochMs;
use crate::model::list::ListId;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of one notification entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Half-life reminder ahead of a due date.
    Reminder,
    /// Deadline passed without completion.
    Expired,
    /// Task marked done.
    Completed,
    /// Degraded-mode warning, for example a failed persistence write.
    Warning,
    /// Recorded locally after the delivery collaborator refused the event.
    Fallback,
}

impl NotificationKind {
    /// Stable lowercase label for log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::Expired => "expired",
            Self::Completed => "completed",
            Self::Warning => "warning",
            Self::Fallback => "fallback",
        }
    }
}

/// One entry in the newest-first notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub task_text: Option<String>,
    pub due_date: Option<EpochMs>,
    pub list_id: Option<ListId>,
    pub time: EpochMs,
}

impl Notification {
    /// Creates an entry with no task context.
    pub fn new(kind: NotificationKind, message: impl Into<String>, time: EpochMs) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            task_text: None,
            due_date: None,
            list_id: None,
            time,
        }
    }

    /// Creates an entry carrying the originating task's context, so
    /// consumers can navigate back to the task.
    pub fn for_task(
        kind: NotificationKind,
        message: impl Into<String>,
        list_id: &ListId,
        task: &Task,
        time: EpochMs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            task_text: Some(task.text.clone()),
            due_date: task.due_date,
            list_id: Some(list_id.clone()),
            time,
        }
    }
}
