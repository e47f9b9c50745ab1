//! Single-pass evaluation engine for due-date events.

use super::fired_keys::{DueEventKind, FiredEventKey, FiredKeySet};
use crate::clock::EpochMs;
use crate::model::list::ListId;
use crate::model::task::Task;
use crate::store::EntityStore;
use log::{debug, warn};

/// Remaining lead time below which a reminder is not worth emitting.
pub const REMINDER_MIN_LEAD_MS: EpochMs = 2 * 60 * 1000;

/// Lifecycle position of one task inside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// No due date: never scheduled, never expires.
    NoDueDate,
    /// Due date ahead, reminder not yet emitted.
    Pending,
    /// Reminder emitted, deadline still ahead.
    ReminderFired,
    /// Deadline passed without completion.
    Expired,
    /// Completed; absorbing.
    Done,
    /// Archived; absorbing.
    Archived,
}

/// One newly due event produced by a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueEvent {
    pub kind: DueEventKind,
    pub list_id: ListId,
    pub task: Task,
    pub message: String,
}

/// Evaluates pending tasks and deduplicates emissions via `FiredKeySet`.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    fired: FiredKeySet,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes with the fired keys persisted by a previous process.
    pub fn with_fired_keys(fired: FiredKeySet) -> Self {
        Self { fired }
    }

    pub fn fired_keys(&self) -> &FiredKeySet {
        &self.fired
    }

    /// Emits every newly due reminder/expiration as of `now`.
    ///
    /// Re-reads current store state: tasks completed, archived or deleted
    /// since the timer was armed simply no longer show up here. Several
    /// events may have become due at once; all are emitted in one pass.
    pub fn run_pass(&mut self, store: &EntityStore, now: EpochMs) -> Vec<DueEvent> {
        let mut events = Vec::new();
        for list in store.lists() {
            for task in store.active_tasks(&list.id) {
                match self.evaluate_task(&list.id, task, now) {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => {}
                    Err(reason) => {
                        // One bad record must not halt the whole pass.
                        warn!(
                            "event=schedule_skip module=schedule status=error task_id={} reason={reason}",
                            task.id
                        );
                    }
                }
            }
        }
        if !events.is_empty() {
            debug!(
                "event=schedule_pass module=schedule status=ok emitted={}",
                events.len()
            );
        }
        events
    }

    fn evaluate_task(
        &mut self,
        list_id: &ListId,
        task: &Task,
        now: EpochMs,
    ) -> Result<Option<DueEvent>, &'static str> {
        let Some(due) = task.due_date else {
            return Ok(None);
        };
        if task.done || task.archived {
            return Ok(None);
        }
        if due < task.created {
            return Err("due date precedes creation");
        }

        if now >= due {
            let key = FiredEventKey {
                list_id: list_id.clone(),
                task_id: task.id,
                due_date: due,
                kind: DueEventKind::Expired,
            };
            if self.fired.insert(key) {
                return Ok(Some(DueEvent {
                    kind: DueEventKind::Expired,
                    list_id: list_id.clone(),
                    task: task.clone(),
                    message: format!("Task \"{}\" has expired!", task.text),
                }));
            }
            return Ok(None);
        }

        // Half-life reminder: fire once past the midpoint of the task's
        // lifetime, but only while a useful amount of lead time remains.
        let reminder_at = task.created + (due - task.created) / 2;
        let remaining = due - now;
        if now >= reminder_at && remaining > REMINDER_MIN_LEAD_MS {
            let key = FiredEventKey {
                list_id: list_id.clone(),
                task_id: task.id,
                due_date: due,
                kind: DueEventKind::Reminder,
            };
            if self.fired.insert(key) {
                return Ok(Some(DueEvent {
                    kind: DueEventKind::Reminder,
                    list_id: list_id.clone(),
                    task: task.clone(),
                    message: format!(
                        "Task \"{}\" is due in {}!",
                        task.text,
                        format_duration(remaining)
                    ),
                }));
            }
        }
        Ok(None)
    }

    /// Minimum next event time across all pending tasks.
    ///
    /// `None` means nothing is scheduled. The host arms one timer for the
    /// returned instant; any store mutation recomputes it, so a stale timer
    /// firing early or late is harmless.
    pub fn next_event_at(&self, store: &EntityStore, now: EpochMs) -> Option<EpochMs> {
        let mut next: Option<EpochMs> = None;
        for list in store.lists() {
            for task in store.active_tasks(&list.id) {
                let Some(due) = task.due_date else { continue };
                if task.done || task.archived || due < task.created {
                    continue;
                }
                for candidate in self.task_candidates(&list.id, task, due, now) {
                    next = Some(next.map_or(candidate, |current| current.min(candidate)));
                }
            }
        }
        next
    }

    /// Classifies one task for callers that surface schedule position.
    pub fn state_of(&self, list_id: &ListId, task: &Task, now: EpochMs) -> ScheduleState {
        if task.archived {
            return ScheduleState::Archived;
        }
        if task.done {
            return ScheduleState::Done;
        }
        let Some(due) = task.due_date else {
            return ScheduleState::NoDueDate;
        };
        if now >= due {
            return ScheduleState::Expired;
        }
        let key = FiredEventKey {
            list_id: list_id.clone(),
            task_id: task.id,
            due_date: due,
            kind: DueEventKind::Reminder,
        };
        if self.fired.contains(&key) {
            ScheduleState::ReminderFired
        } else {
            ScheduleState::Pending
        }
    }

    fn task_candidates(
        &self,
        list_id: &ListId,
        task: &Task,
        due: EpochMs,
        now: EpochMs,
    ) -> Vec<EpochMs> {
        let mut candidates = Vec::new();

        let expired_key = FiredEventKey {
            list_id: list_id.clone(),
            task_id: task.id,
            due_date: due,
            kind: DueEventKind::Expired,
        };
        if !self.fired.contains(&expired_key) {
            // An overdue-but-unemitted expiration wants an immediate pass.
            candidates.push(due.max(now));
        }

        if now < due {
            let reminder_at = task.created + (due - task.created) / 2;
            let fire_at = reminder_at.max(now);
            let reminder_key = FiredEventKey {
                list_id: list_id.clone(),
                task_id: task.id,
                due_date: due,
                kind: DueEventKind::Reminder,
            };
            if !self.fired.contains(&reminder_key) && due - fire_at > REMINDER_MIN_LEAD_MS {
                candidates.push(fire_at);
            }
        }

        candidates
    }
}

/// Humanizes a positive duration the way reminder messages read.
pub fn format_duration(ms: EpochMs) -> String {
    let minutes = (ms + 30_000) / 60_000;
    if minutes >= 120 {
        format!("{} hours", (minutes + 30) / 60)
    } else if minutes >= 60 {
        "1 hour".to_string()
    } else if minutes > 1 {
        format!("{minutes} minutes")
    } else {
        "a moment".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn format_duration_buckets() {
        assert_eq!(format_duration(30_000), "a moment");
        assert_eq!(format_duration(60_000), "a moment");
        assert_eq!(format_duration(5 * 60_000), "5 minutes");
        assert_eq!(format_duration(59 * 60_000), "59 minutes");
        assert_eq!(format_duration(75 * 60_000), "1 hour");
        assert_eq!(format_duration(180 * 60_000), "3 hours");
    }
}
