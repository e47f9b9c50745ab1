//! Tracker use-case service.
//!
//! # Responsibility
//! - Orchestrate entity mutations with undo staging, notification
//!   emission, schedule re-evaluation and persistence mirroring.
//! - Expose the single-timer contract: `next_wakeup` plus `tick`.
//!
//! # Invariants
//! - Every mutation triggers an immediate schedule pass; a stale timer
//!   firing afterwards is harmless.
//! - Persistence failures degrade to warnings; in-memory state never
//!   rolls back.
//! - Nothing panics out of the tick path.

use crate::clock::{Clock, EpochMs};
use crate::export::{build_snapshot, ExportSnapshot};
use crate::model::list::{List, ListId};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::notify::{NotificationDelivery, NotificationSink};
use crate::persist::{PersistError, PersistenceAdapter, Storage};
use crate::schedule::{DueEventKind, ReminderScheduler, ScheduleState};
use crate::store::{EntityStore, StoreResult, ValidationError};
use crate::undo::{UndoAction, UndoEntry, UndoQueue};
use log::{error, info};

/// Tunables for one tracker instance.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Undo grace window in milliseconds.
    pub undo_grace_ms: EpochMs,
    /// Notification log retention cap.
    pub notification_cap: usize,
    /// Snapshot size budget in bytes.
    pub storage_budget_bytes: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            undo_grace_ms: crate::undo::DEFAULT_UNDO_GRACE_MS,
            notification_cap: crate::notify::NOTIFICATION_CAP,
            storage_budget_bytes: crate::persist::STORAGE_BUDGET_BYTES,
        }
    }
}

/// Facade owning every core component.
///
/// There is one logical actor: all operations run synchronously on the
/// caller's thread, and `tick` is the only entry point meant to be driven
/// by a timer.
pub struct TrackerService<C: Clock, S: Storage, D: NotificationDelivery> {
    clock: C,
    delivery: D,
    store: EntityStore,
    scheduler: ReminderScheduler,
    undo: UndoQueue,
    sink: NotificationSink,
    persistence: PersistenceAdapter<S>,
    config: TrackerConfig,
    /// Capacity warning already surfaced; reset by a clean save.
    storage_warned: bool,
}

impl<C: Clock, S: Storage, D: NotificationDelivery> TrackerService<C, S, D> {
    /// Loads prior state from storage and wires all components.
    ///
    /// Missing or malformed snapshot content degrades to an empty tracker;
    /// only substrate I/O failures surface here.
    pub fn open(clock: C, storage: S, delivery: D, config: TrackerConfig) -> Result<Self, PersistError> {
        let persistence = PersistenceAdapter::with_budget(storage, config.storage_budget_bytes);
        let state = persistence.load()?;
        let fired = persistence.load_fired_keys()?;
        info!(
            "event=tracker_open module=service status=ok lists={} fired_keys={}",
            state.lists.len(),
            fired.len()
        );
        Ok(Self {
            clock,
            delivery,
            store: EntityStore::from_state(state),
            scheduler: ReminderScheduler::with_fired_keys(fired),
            undo: UndoQueue::new(),
            sink: NotificationSink::with_cap(config.notification_cap),
            persistence,
            config,
            storage_warned: false,
        })
    }

    // -- lists --

    pub fn create_list(&mut self, name: &str) -> Result<ListId, ValidationError> {
        let id = self.store.add_list(name)?;
        info!("event=list_add module=service status=ok list_id={id}");
        self.mirror();
        Ok(id)
    }

    /// Soft-removes a list behind the undo grace window.
    pub fn delete_list(&mut self, id: &ListId) -> Result<(), ValidationError> {
        let now = self.clock.now();
        let Some((list, tasks, archive)) = self.store.remove_list(id) else {
            return Err(ValidationError::UnknownList(id.clone()));
        };
        info!("event=list_remove module=service status=ok list_id={}", list.id);
        self.undo.stage(
            UndoAction::ListDeleted {
                list,
                tasks,
                archive,
            },
            now,
            self.config.undo_grace_ms,
        );
        self.after_mutation(now);
        Ok(())
    }

    pub fn lists(&self) -> &[List] {
        self.store.lists()
    }

    // -- tasks --

    pub fn create_task(
        &mut self,
        list_id: &ListId,
        draft: TaskDraft,
    ) -> Result<TaskId, ValidationError> {
        let now = self.clock.now();
        let id = self.store.add_task(list_id, draft, now)?;
        info!("event=task_add module=service status=ok list_id={list_id} task_id={id}");
        self.after_mutation(now);
        Ok(id)
    }

    /// Toggles completion state.
    ///
    /// Completing emits a notification and forwards it to delivery;
    /// un-completing is silent. Expired tasks refuse the transition to
    /// done.
    pub fn set_task_done(&mut self, list_id: &ListId, index: usize, done: bool) -> StoreResult<()> {
        let now = self.clock.now();
        let (task, changed) = self.store.set_task_done(list_id, index, done, now)?;
        if done && changed {
            info!(
                "event=task_complete module=service status=ok list_id={list_id} task_id={}",
                task.id
            );
            let message = format!("Task \"{}\" marked as completed!", task.text);
            let notification =
                Notification::for_task(NotificationKind::Completed, message, list_id, &task, now);
            self.sink
                .emit_delivered(&mut self.store, notification, "Task Completed", &mut self.delivery);
        }
        self.after_mutation(now);
        Ok(())
    }

    /// Replaces a task's due date and re-evaluates immediately, so a
    /// deadline pulled earlier never waits for the stale timer.
    pub fn set_task_due_date(
        &mut self,
        list_id: &ListId,
        index: usize,
        due_date: Option<EpochMs>,
    ) -> StoreResult<()> {
        let now = self.clock.now();
        self.store.set_task_due_date(list_id, index, due_date)?;
        self.after_mutation(now);
        Ok(())
    }

    /// Moves a task into the list's archive behind the undo grace window.
    pub fn archive_task(&mut self, list_id: &ListId, index: usize) -> StoreResult<()> {
        let now = self.clock.now();
        let (task, origin_index) = self.store.archive_task(list_id, index)?;
        info!(
            "event=task_archive module=service status=ok list_id={list_id} task_id={}",
            task.id
        );
        self.undo.stage(
            UndoAction::TaskArchived {
                list_id: list_id.clone(),
                task,
                index: origin_index,
            },
            now,
            self.config.undo_grace_ms,
        );
        self.after_mutation(now);
        Ok(())
    }

    /// Deletes a task from the active or archive sequence behind the undo
    /// grace window.
    pub fn delete_task(
        &mut self,
        list_id: &ListId,
        index: usize,
        from_archive: bool,
    ) -> StoreResult<()> {
        let now = self.clock.now();
        let task = self.store.remove_task(list_id, index, from_archive)?;
        info!(
            "event=task_remove module=service status=ok list_id={list_id} task_id={} from_archive={from_archive}",
            task.id
        );
        self.undo.stage(
            UndoAction::TaskDeleted {
                list_id: list_id.clone(),
                task,
                index,
                from_archive,
            },
            now,
            self.config.undo_grace_ms,
        );
        self.after_mutation(now);
        Ok(())
    }

    /// Permanently empties one list's archive. Not undoable; the UI gates
    /// this behind an explicit confirmation.
    pub fn clear_archive(&mut self, list_id: &ListId) -> Result<usize, ValidationError> {
        let drained = self.store.clear_archive(list_id)?;
        info!("event=archive_clear module=service status=ok list_id={list_id} drained={drained}");
        self.mirror();
        Ok(drained)
    }

    pub fn active_tasks(&self, list_id: &ListId) -> &[Task] {
        self.store.active_tasks(list_id)
    }

    pub fn archived_tasks(&self, list_id: &ListId) -> &[Task] {
        self.store.archived_tasks(list_id)
    }

    /// Schedule position of one active task, for status displays.
    pub fn schedule_state(&self, list_id: &ListId, index: usize) -> Option<ScheduleState> {
        let task = self.store.active_tasks(list_id).get(index)?;
        Some(self.scheduler.state_of(list_id, task, self.clock.now()))
    }

    // -- undo --

    /// Reverses a staged destructive action while its window is open.
    ///
    /// Subjects are task ids (as strings) or list ids. Returns whether a
    /// restore happened; a missed window is a benign no-op.
    pub fn undo(&mut self, subject_id: &str) -> bool {
        let now = self.clock.now();
        let restored = self.undo.undo(subject_id, now, &mut self.store);
        if restored {
            info!("event=undo_apply module=service status=ok subject={subject_id}");
            self.after_mutation(now);
        }
        restored
    }

    /// Entries still inside their grace window.
    pub fn pending_undos(&self) -> &[UndoEntry] {
        self.undo.pending()
    }

    // -- notifications --

    pub fn notifications(&self) -> &[Notification] {
        self.store.notifications()
    }

    pub fn unseen_notifications(&self) -> usize {
        self.sink.unseen()
    }

    pub fn mark_notifications_seen(&mut self) {
        self.sink.mark_all_seen();
    }

    pub fn clear_notifications(&mut self) {
        self.sink.clear(&mut self.store);
        self.mirror();
    }

    // -- scheduling --

    /// Timer callback: one schedule pass, undo purge and persistence
    /// mirror. Safe to call at any time; all work is deduplicated or
    /// idempotent. Returns the number of newly emitted events.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let emitted = self.run_schedule_pass(now);
        self.undo.purge_expired(now);
        self.mirror();
        emitted
    }

    /// Earliest instant at which `tick` has work to do: the minimum of the
    /// next schedule event and the next undo expiry. The host arms exactly
    /// one timer for it, re-arming after every mutation.
    pub fn next_wakeup(&self) -> Option<EpochMs> {
        let now = self.clock.now();
        let schedule_at = self.scheduler.next_event_at(&self.store, now);
        let undo_at = self.undo.next_expiry();
        match (schedule_at, undo_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -- export --

    /// Read-only projection for renderer collaborators.
    pub fn export_snapshot(&self) -> ExportSnapshot {
        build_snapshot(&self.store, self.clock.now())
    }

    /// Serialized snapshot size, for capacity displays.
    pub fn estimate_snapshot_bytes(&self) -> Option<usize> {
        self.persistence.estimate_size(self.store.state()).ok()
    }

    // -- internals --

    fn run_schedule_pass(&mut self, now: EpochMs) -> usize {
        let events = self.scheduler.run_pass(&self.store, now);
        let emitted = events.len();
        for event in events {
            let (kind, title) = match event.kind {
                DueEventKind::Reminder => (NotificationKind::Reminder, "Task Reminder"),
                DueEventKind::Expired => (NotificationKind::Expired, "Task Expired"),
            };
            let notification =
                Notification::for_task(kind, event.message, &event.list_id, &event.task, now);
            self.sink
                .emit_delivered(&mut self.store, notification, title, &mut self.delivery);
        }
        emitted
    }

    /// Post-mutation pass: immediate schedule re-evaluation plus
    /// persistence mirroring.
    fn after_mutation(&mut self, now: EpochMs) {
        self.run_schedule_pass(now);
        self.mirror();
    }

    /// Fire-and-forget persistence with error capture.
    ///
    /// A quota rejection leaves memory state untouched and surfaces one
    /// warning notification until a save succeeds again; persisted state
    /// may lag until space frees up.
    fn mirror(&mut self) {
        let now = self.clock.now();
        match self.persistence.save(self.store.state()) {
            Ok(report) if report.near_capacity => {
                if !self.storage_warned {
                    self.storage_warned = true;
                    let message = format!(
                        "Storage almost full: {} of {} bytes used.",
                        report.bytes,
                        self.persistence.budget_bytes()
                    );
                    self.sink
                        .emit(&mut self.store, Notification::new(NotificationKind::Warning, message, now));
                }
            }
            Ok(_) => {
                self.storage_warned = false;
            }
            Err(PersistError::QuotaExceeded { attempted_bytes }) => {
                error!(
                    "event=persist_mirror module=service status=error error=quota attempted={attempted_bytes}"
                );
                if !self.storage_warned {
                    self.storage_warned = true;
                    self.sink.emit(
                        &mut self.store,
                        Notification::new(
                            NotificationKind::Warning,
                            "Storage is full; changes are kept in memory only.",
                            now,
                        ),
                    );
                }
            }
            Err(err) => {
                error!("event=persist_mirror module=service status=error error={err}");
            }
        }

        if let Err(err) = self.persistence.save_fired_keys(self.scheduler.fired_keys()) {
            error!("event=persist_fired module=service status=error error={err}");
        }
    }
}
