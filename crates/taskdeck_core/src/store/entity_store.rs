//! Atomic operations over the canonical collections.

use super::state::StoreState;
use super::{IndexError, StoreError, StoreResult, ValidationError};
use crate::clock::EpochMs;
use crate::model::list::{List, ListId, MAX_LIST_NAME_CHARS};
use crate::model::notification::Notification;
use crate::model::task::{normalize_task_text, Task, TaskDraft, TaskId, MAX_TASK_TEXT_CHARS};

/// Owner of all entity collections.
///
/// Mutations are synchronous and atomic with respect to each other; there
/// is exactly one logical actor, so no synchronization primitives are
/// layered on top.
#[derive(Debug, Default)]
pub struct EntityStore {
    state: StoreState,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps previously persisted state, repairing bucket bookkeeping.
    pub fn from_state(mut state: StoreState) -> Self {
        state.normalize();
        Self { state }
    }

    /// Read-only view of the full state, for snapshotting and export.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    // -- lists --

    /// Creates a list with empty task and archive buckets.
    pub fn add_list(&mut self, name: &str) -> Result<ListId, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyListName);
        }
        let length = name.chars().count();
        if length > MAX_LIST_NAME_CHARS {
            return Err(ValidationError::ListNameTooLong {
                length,
                max: MAX_LIST_NAME_CHARS,
            });
        }
        if self.state.lists.iter().any(|list| list.name == name) {
            return Err(ValidationError::DuplicateListName(name.to_string()));
        }

        let list = List::new(name);
        let id = list.id.clone();
        self.state.tasks.insert(id.clone(), Vec::new());
        self.state.archive.insert(id.clone(), Vec::new());
        self.state.lists.push(list);
        Ok(id)
    }

    /// Detaches a list together with both of its buckets.
    ///
    /// The data is returned instead of erased; callers stage it in the
    /// undo queue before the removal becomes permanent.
    pub fn remove_list(&mut self, id: &ListId) -> Option<(List, Vec<Task>, Vec<Task>)> {
        let position = self.state.lists.iter().position(|list| &list.id == id)?;
        let list = self.state.lists.remove(position);
        let tasks = self.state.tasks.remove(id).unwrap_or_default();
        let archive = self.state.archive.remove(id).unwrap_or_default();
        Some((list, tasks, archive))
    }

    /// Reinserts a previously removed list with its buckets.
    ///
    /// No-op when a list with that id already exists.
    pub fn restore_list(&mut self, list: List, tasks: Vec<Task>, archive: Vec<Task>) {
        if self.state.lists.iter().any(|existing| existing.id == list.id) {
            return;
        }
        self.state.tasks.insert(list.id.clone(), tasks);
        self.state.archive.insert(list.id.clone(), archive);
        self.state.lists.push(list);
    }

    pub fn lists(&self) -> &[List] {
        &self.state.lists
    }

    pub fn contains_list(&self, id: &ListId) -> bool {
        self.state.lists.iter().any(|list| &list.id == id)
    }

    // -- tasks --

    /// Inserts a new task at the head of the list's active sequence.
    ///
    /// Index 0 being the most recent task is an invariant consumers rely
    /// on. An existing active task with identical text and due date is a
    /// duplicate submission, not a new task.
    pub fn add_task(
        &mut self,
        list_id: &ListId,
        draft: TaskDraft,
        now: EpochMs,
    ) -> Result<TaskId, ValidationError> {
        let text = normalize_task_text(&draft.text);
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }
        let length = text.chars().count();
        if length > MAX_TASK_TEXT_CHARS {
            return Err(ValidationError::TaskTextTooLong {
                length,
                max: MAX_TASK_TEXT_CHARS,
            });
        }

        let bucket = self
            .state
            .tasks
            .get_mut(list_id)
            .ok_or_else(|| ValidationError::UnknownList(list_id.clone()))?;
        if bucket
            .iter()
            .any(|task| task.text == text && task.due_date == draft.due_date)
        {
            return Err(ValidationError::DuplicateTask { text });
        }

        let task = Task::from_draft(TaskDraft { text, ..draft }, now);
        let id = task.id;
        bucket.insert(0, task);
        Ok(id)
    }

    /// Flips completion state, maintaining the completion stamp.
    ///
    /// Returns the updated task and whether the flag actually changed.
    /// The transition to done is refused for expired tasks.
    pub fn set_task_done(
        &mut self,
        list_id: &ListId,
        index: usize,
        done: bool,
        now: EpochMs,
    ) -> StoreResult<(Task, bool)> {
        let task = self.active_task_mut(list_id, index)?;
        if done && task.is_expired(now) {
            return Err(ValidationError::TaskExpired.into());
        }
        let changed = task.done != done;
        if changed {
            task.done = done;
            task.completed_at = if done { Some(now) } else { None };
        }
        Ok((task.clone(), changed))
    }

    /// Replaces the due date of one active task.
    pub fn set_task_due_date(
        &mut self,
        list_id: &ListId,
        index: usize,
        due_date: Option<EpochMs>,
    ) -> StoreResult<Task> {
        let task = self.active_task_mut(list_id, index)?;
        task.due_date = due_date;
        Ok(task.clone())
    }

    /// Moves the task at `index` to the archive tail.
    ///
    /// Returns the archived copy and its original active index for undo
    /// staging.
    pub fn archive_task(&mut self, list_id: &ListId, index: usize) -> StoreResult<(Task, usize)> {
        let bucket = self
            .state
            .tasks
            .get_mut(list_id)
            .ok_or_else(|| ValidationError::UnknownList(list_id.clone()))
            .map_err(StoreError::from)?;
        if index >= bucket.len() {
            return Err(IndexError {
                index,
                len: bucket.len(),
            }
            .into());
        }

        let mut task = bucket.remove(index);
        task.archived = true;
        let copy = task.clone();
        self.state.archive.entry(list_id.clone()).or_default().push(task);
        Ok((copy, index))
    }

    /// Permanently deletes from the active or archive sequence.
    pub fn remove_task(
        &mut self,
        list_id: &ListId,
        index: usize,
        from_archive: bool,
    ) -> StoreResult<Task> {
        let bucket = self.bucket_mut(list_id, from_archive)?;
        if index >= bucket.len() {
            return Err(IndexError {
                index,
                len: bucket.len(),
            }
            .into());
        }
        Ok(bucket.remove(index))
    }

    /// Best-effort reinsert at `index` in the chosen sequence, appending
    /// when the sequence has shrunk below it.
    pub fn restore_task(
        &mut self,
        list_id: &ListId,
        task: Task,
        index: usize,
        to_archive: bool,
    ) -> Result<(), ValidationError> {
        let map = if to_archive {
            &mut self.state.archive
        } else {
            &mut self.state.tasks
        };
        let bucket = map
            .get_mut(list_id)
            .ok_or_else(|| ValidationError::UnknownList(list_id.clone()))?;
        let at = index.min(bucket.len());
        bucket.insert(at, task);
        Ok(())
    }

    /// Permanently empties one list's archive.
    pub fn clear_archive(&mut self, list_id: &ListId) -> Result<usize, ValidationError> {
        let bucket = self
            .state
            .archive
            .get_mut(list_id)
            .ok_or_else(|| ValidationError::UnknownList(list_id.clone()))?;
        let drained = bucket.len();
        bucket.clear();
        Ok(drained)
    }

    pub fn active_tasks(&self, list_id: &ListId) -> &[Task] {
        self.state
            .tasks
            .get(list_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn archived_tasks(&self, list_id: &ListId) -> &[Task] {
        self.state
            .archive
            .get(list_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locates a task by id in the chosen sequence.
    ///
    /// Undo reversal resolves archived tasks this way rather than trusting
    /// an index captured before other mutations ran.
    pub fn position_of(&self, list_id: &ListId, task_id: TaskId, in_archive: bool) -> Option<usize> {
        let map = if in_archive {
            &self.state.archive
        } else {
            &self.state.tasks
        };
        map.get(list_id)?.iter().position(|task| task.id == task_id)
    }

    // -- notifications --

    /// Read access to the newest-first notification log.
    pub fn notifications(&self) -> &[Notification] {
        &self.state.notifications
    }

    /// Mutable log access, reserved for the notification sink.
    pub(crate) fn notifications_mut(&mut self) -> &mut Vec<Notification> {
        &mut self.state.notifications
    }

    // -- helpers --

    fn bucket_mut(&mut self, list_id: &ListId, archive: bool) -> StoreResult<&mut Vec<Task>> {
        let map = if archive {
            &mut self.state.archive
        } else {
            &mut self.state.tasks
        };
        map.get_mut(list_id)
            .ok_or_else(|| ValidationError::UnknownList(list_id.clone()).into())
    }

    fn active_task_mut(&mut self, list_id: &ListId, index: usize) -> StoreResult<&mut Task> {
        let bucket = self.bucket_mut(list_id, false)?;
        let len = bucket.len();
        bucket
            .get_mut(index)
            .ok_or_else(|| IndexError { index, len }.into())
    }
}
