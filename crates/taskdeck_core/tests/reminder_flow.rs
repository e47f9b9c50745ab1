use std::cell::RefCell;
use std::rc::Rc;
use taskdeck_core::{
    DeliveryError, ManualClock, MemoryStorage, NotificationDelivery, NotificationKind,
    NullDelivery, ScheduleState, SqliteStorage, TaskDraft, TrackerConfig, TrackerService,
};

const T0: i64 = 1_700_000_000_000;

#[derive(Clone, Default)]
struct RecordingDelivery {
    sent: Rc<RefCell<Vec<(String, String)>>>,
    deny: bool,
}

impl NotificationDelivery for RecordingDelivery {
    fn deliver(&mut self, title: &str, body: &str) -> Result<(), DeliveryError> {
        if self.deny {
            return Err(DeliveryError::PermissionDenied);
        }
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

fn tracker_with(
    clock: &ManualClock,
    delivery: RecordingDelivery,
) -> TrackerService<ManualClock, MemoryStorage, RecordingDelivery> {
    TrackerService::open(
        clock.clone(),
        MemoryStorage::new(),
        delivery,
        TrackerConfig::default(),
    )
    .expect("tracker should open on empty storage")
}

fn count_kind(
    tracker: &TrackerService<ManualClock, MemoryStorage, RecordingDelivery>,
    kind: NotificationKind,
) -> usize {
    tracker
        .notifications()
        .iter()
        .filter(|n| n.kind == kind)
        .count()
}

#[test]
fn half_life_reminder_then_expiration_fire_exactly_once() {
    let clock = ManualClock::new(T0);
    let delivery = RecordingDelivery::default();
    let sent = delivery.sent.clone();
    let mut tracker = tracker_with(&clock, delivery);

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("Pay bills").due(T0 + 600_000))
        .unwrap();

    // Reminder is planned for the midpoint of the task's lifetime.
    assert_eq!(tracker.next_wakeup(), Some(T0 + 300_000));
    assert_eq!(tracker.tick(), 0);
    assert_eq!(
        tracker.schedule_state(&list, 0),
        Some(ScheduleState::Pending)
    );

    clock.set(T0 + 300_000);
    assert_eq!(tracker.tick(), 1);
    assert_eq!(
        tracker.schedule_state(&list, 0),
        Some(ScheduleState::ReminderFired)
    );
    let reminder = &tracker.notifications()[0];
    assert_eq!(reminder.kind, NotificationKind::Reminder);
    assert!(reminder.message.contains("Pay bills"));
    assert!(reminder.message.contains("5 minutes"));
    assert_eq!(sent.borrow().len(), 1);
    assert_eq!(sent.borrow()[0].0, "Task Reminder");

    // Re-evaluation at the same instant emits nothing new.
    assert_eq!(tracker.tick(), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Reminder), 1);

    // Next wakeup moves on to the deadline itself.
    assert_eq!(tracker.next_wakeup(), Some(T0 + 600_000));

    clock.set(T0 + 600_000);
    assert_eq!(tracker.tick(), 1);
    assert_eq!(count_kind(&tracker, NotificationKind::Expired), 1);
    assert!(tracker.notifications()[0].message.contains("has expired"));

    assert_eq!(tracker.tick(), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Expired), 1);
    assert_eq!(tracker.next_wakeup(), None);

    // Both events count as unseen until the user opens the log.
    assert_eq!(tracker.unseen_notifications(), 2);
    tracker.mark_notifications_seen();
    assert_eq!(tracker.unseen_notifications(), 0);
    assert_eq!(tracker.notifications().len(), 2);
}

#[test]
fn completing_before_the_deadline_prevents_expiration() {
    let clock = ManualClock::new(T0);
    let mut tracker = tracker_with(&clock, RecordingDelivery::default());

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("Pay bills").due(T0 + 600_000))
        .unwrap();

    clock.set(T0 + 200_000);
    tracker.set_task_done(&list, 0, true).unwrap();
    assert_eq!(count_kind(&tracker, NotificationKind::Completed), 1);

    clock.set(T0 + 600_000);
    assert_eq!(tracker.tick(), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Expired), 0);
    // A done task is absorbing: nothing remains scheduled.
    assert_eq!(tracker.next_wakeup(), None);
}

#[test]
fn short_lead_tasks_skip_the_reminder_but_still_expire() {
    let clock = ManualClock::new(T0);
    let mut tracker = tracker_with(&clock, RecordingDelivery::default());

    let list = tracker.create_list("Errands").unwrap();
    // Midpoint would leave only 100 s of lead, under the 2 min floor.
    tracker
        .create_task(&list, TaskDraft::new("quick errand").due(T0 + 200_000))
        .unwrap();

    assert_eq!(tracker.next_wakeup(), Some(T0 + 200_000));

    clock.set(T0 + 100_000);
    assert_eq!(tracker.tick(), 0);

    clock.set(T0 + 200_000);
    assert_eq!(tracker.tick(), 1);
    assert_eq!(count_kind(&tracker, NotificationKind::Reminder), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Expired), 1);
}

#[test]
fn pulling_a_due_date_earlier_fires_the_overdue_reminder_immediately() {
    let clock = ManualClock::new(T0);
    let mut tracker = tracker_with(&clock, RecordingDelivery::default());

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("prepare slides").due(T0 + 3_600_000))
        .unwrap();

    // The new deadline puts the midpoint in the past; the mutation itself
    // must re-evaluate instead of waiting for the stale timer.
    clock.set(T0 + 130_000);
    tracker
        .set_task_due_date(&list, 0, Some(T0 + 260_000))
        .unwrap();

    assert_eq!(count_kind(&tracker, NotificationKind::Reminder), 1);
    assert!(tracker.notifications()[0].message.contains("prepare slides"));
}

#[test]
fn archived_tasks_are_excluded_from_scheduling() {
    let clock = ManualClock::new(T0);
    let mut tracker = tracker_with(&clock, RecordingDelivery::default());

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("shelved").due(T0 + 600_000))
        .unwrap();
    tracker.archive_task(&list, 0).unwrap();

    clock.set(T0 + 700_000);
    assert_eq!(tracker.tick(), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Expired), 0);
}

#[test]
fn undo_deadline_participates_in_next_wakeup() {
    let clock = ManualClock::new(T0);
    let mut tracker = tracker_with(&clock, RecordingDelivery::default());

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("no due date"))
        .unwrap();
    tracker.archive_task(&list, 0).unwrap();

    assert_eq!(tracker.next_wakeup(), Some(T0 + 6_000));
}

#[test]
fn denied_delivery_records_a_fallback_entry() {
    let clock = ManualClock::new(T0);
    let delivery = RecordingDelivery {
        deny: true,
        ..RecordingDelivery::default()
    };
    let mut tracker = tracker_with(&clock, delivery);

    let list = tracker.create_list("Work").unwrap();
    tracker
        .create_task(&list, TaskDraft::new("Pay bills").due(T0 + 600_000))
        .unwrap();

    clock.set(T0 + 300_000);
    assert_eq!(tracker.tick(), 1);

    assert_eq!(count_kind(&tracker, NotificationKind::Reminder), 0);
    assert_eq!(count_kind(&tracker, NotificationKind::Fallback), 1);
    assert!(tracker.notifications()[0].message.contains("Pay bills"));
}

#[test]
fn fired_keys_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskdeck.sqlite3");
    let clock = ManualClock::new(T0);

    let list_id = {
        let storage = SqliteStorage::open(&path).unwrap();
        let mut tracker =
            TrackerService::open(clock.clone(), storage, NullDelivery, TrackerConfig::default())
                .unwrap();
        let list = tracker.create_list("Taxes").unwrap();
        tracker
            .create_task(&list, TaskDraft::new("file return").due(T0 + 600_000))
            .unwrap();

        clock.set(T0 + 300_000);
        assert_eq!(tracker.tick(), 1);
        list
    };

    // A fresh process over the same database must not repeat the reminder.
    let storage = SqliteStorage::open(&path).unwrap();
    let mut tracker =
        TrackerService::open(clock.clone(), storage, NullDelivery, TrackerConfig::default())
            .unwrap();
    assert_eq!(tracker.lists()[0].id, list_id);
    assert_eq!(tracker.tick(), 0);
    assert_eq!(
        tracker
            .notifications()
            .iter()
            .filter(|n| n.kind == NotificationKind::Reminder)
            .count(),
        1
    );

    clock.set(T0 + 600_000);
    assert_eq!(tracker.tick(), 1);
    assert_eq!(tracker.tick(), 0);
}
