//! Read-only export projection.
//!
//! # Responsibility
//! - Flatten store state into renderer-agnostic rows with derived status.
//! - Keep document formatting behind the `ExportRenderer` seam.

use crate::clock::EpochMs;
use crate::model::list::List;
use crate::model::task::Task;
use crate::store::EntityStore;

/// Derived display status for one exported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Active,
    Completed,
    Expired,
    Archived,
}

impl ExportStatus {
    /// Stable label used by tabular renderers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Expired => "Expired",
            Self::Archived => "Archived",
        }
    }
}

/// One flattened task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub text: String,
    pub due_date: Option<EpochMs>,
    pub completed_at: Option<EpochMs>,
    pub status: ExportStatus,
}

/// Per-list grouping of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExport {
    pub list: List,
    pub active: Vec<ExportRow>,
    pub archived: Vec<ExportRow>,
}

/// Renderer-agnostic snapshot of everything exportable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSnapshot {
    pub generated_at: EpochMs,
    pub lists: Vec<ListExport>,
}

/// Document producer collaborator (PDF, CSV, ...).
///
/// The core never inspects the document; formatting is entirely the
/// renderer's concern.
pub trait ExportRenderer {
    type Document;

    fn render(&self, snapshot: &ExportSnapshot) -> Self::Document;
}

/// Builds the export snapshot from current state.
pub fn build_snapshot(store: &EntityStore, now: EpochMs) -> ExportSnapshot {
    let lists = store
        .lists()
        .iter()
        .map(|list| ListExport {
            list: list.clone(),
            active: store
                .active_tasks(&list.id)
                .iter()
                .map(|task| export_row(task, now, false))
                .collect(),
            archived: store
                .archived_tasks(&list.id)
                .iter()
                .map(|task| export_row(task, now, true))
                .collect(),
        })
        .collect();
    ExportSnapshot {
        generated_at: now,
        lists,
    }
}

fn export_row(task: &Task, now: EpochMs, archived: bool) -> ExportRow {
    ExportRow {
        text: task.text.clone(),
        due_date: task.due_date,
        completed_at: task.completed_at,
        status: row_status(task, now, archived),
    }
}

/// Status precedence: an overdue deadline wins, then completion, then the
/// archive context.
fn row_status(task: &Task, now: EpochMs, archived: bool) -> ExportStatus {
    let overdue = !task.done && task.due_date.is_some_and(|due| due < now);
    if overdue {
        ExportStatus::Expired
    } else if task.done {
        ExportStatus::Completed
    } else if archived {
        ExportStatus::Archived
    } else {
        ExportStatus::Active
    }
}
