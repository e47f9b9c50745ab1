//! Serializable snapshot of every entity collection.

use crate::model::list::{List, ListId};
use crate::model::notification::Notification;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Full persisted state of the tracker.
///
/// Buckets are keyed by list id; the store keeps one (possibly empty)
/// bucket pair per known list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub tasks: BTreeMap<ListId, Vec<Task>>,
    #[serde(default)]
    pub archive: BTreeMap<ListId, Vec<Task>>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl StoreState {
    /// Repairs bucket bookkeeping after deserialization.
    ///
    /// Known lists get empty buckets filled in when absent and buckets
    /// whose list no longer exists are dropped; partially written prior
    /// state must not crash startup.
    pub fn normalize(&mut self) {
        let known: BTreeSet<ListId> = self.lists.iter().map(|list| list.id.clone()).collect();
        for id in &known {
            self.tasks.entry(id.clone()).or_default();
            self.archive.entry(id.clone()).or_default();
        }
        self.tasks.retain(|id, _| known.contains(id));
        self.archive.retain(|id, _| known.contains(id));
    }
}
