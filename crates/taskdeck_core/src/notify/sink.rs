//! Append gateway for the notification log.

use super::delivery::NotificationDelivery;
use crate::model::notification::{Notification, NotificationKind};
use crate::store::EntityStore;
use log::info;

/// Maximum retained notification entries.
pub const NOTIFICATION_CAP: usize = 100;

/// Mutation gateway into the store's notification log.
///
/// Owns the unseen counter and the retention cap; the log itself lives in
/// the entity store so it persists with the rest of the snapshot.
#[derive(Debug)]
pub struct NotificationSink {
    unseen: usize,
    cap: usize,
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self {
            unseen: 0,
            cap: NOTIFICATION_CAP,
        }
    }
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self { unseen: 0, cap }
    }

    /// Prepends one entry, truncates to the cap and bumps the unseen
    /// counter.
    pub fn emit(&mut self, store: &mut EntityStore, notification: Notification) {
        info!(
            "event=notify_emit module=notify status=ok kind={}",
            notification.kind.label()
        );
        let log = store.notifications_mut();
        log.insert(0, notification);
        log.truncate(self.cap);
        self.unseen = (self.unseen + 1).min(self.cap);
    }

    /// Records one entry and forwards it to the delivery collaborator.
    ///
    /// When delivery fails the entry is recorded with `Fallback` kind, so
    /// the event is never silently lost.
    pub fn emit_delivered<D: NotificationDelivery>(
        &mut self,
        store: &mut EntityStore,
        mut notification: Notification,
        title: &str,
        delivery: &mut D,
    ) {
        if let Err(err) = delivery.deliver(title, &notification.message) {
            info!(
                "event=notify_deliver module=notify status=error kind={} error={err}",
                notification.kind.label()
            );
            notification.kind = NotificationKind::Fallback;
        }
        self.emit(store, notification);
    }

    pub fn unseen(&self) -> usize {
        self.unseen
    }

    /// Resets the unseen counter without touching the log.
    pub fn mark_all_seen(&mut self) {
        self.unseen = 0;
    }

    /// Empties the log and resets the unseen counter.
    pub fn clear(&mut self, store: &mut EntityStore) {
        store.notifications_mut().clear();
        self.unseen = 0;
    }
}
