//! Snapshot persistence adapter.

use super::storage::{Storage, StorageError};
use super::{PersistError, PersistResult};
use crate::schedule::FiredKeySet;
use crate::store::StoreState;
use log::{error, warn};

/// Storage key holding the entity snapshot.
pub const SNAPSHOT_KEY: &str = "taskdeck/state";
/// Storage key holding the fired-event key set.
pub const FIRED_KEYS_KEY: &str = "taskdeck/fired";
/// Fixed snapshot size budget.
pub const STORAGE_BUDGET_BYTES: usize = 5 * 1024 * 1024;

const NEAR_CAPACITY_PERCENT: usize = 90;

/// Outcome of one successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub bytes: usize,
    /// Set when the snapshot crossed the warning fraction of the budget.
    pub near_capacity: bool,
}

/// Sole caller of the storage substrate.
pub struct PersistenceAdapter<S: Storage> {
    storage: S,
    budget_bytes: usize,
}

impl<S: Storage> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self::with_budget(storage, STORAGE_BUDGET_BYTES)
    }

    pub fn with_budget(storage: S, budget_bytes: usize) -> Self {
        Self {
            storage,
            budget_bytes,
        }
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Serializes and writes the full snapshot.
    ///
    /// The report flags snapshots at or past 90% of the budget so callers
    /// can warn before writes actually start failing.
    pub fn save(&mut self, state: &StoreState) -> PersistResult<SaveReport> {
        let payload = serde_json::to_vec(state).map_err(PersistError::Encode)?;
        let bytes = payload.len();
        self.write(SNAPSHOT_KEY, &payload)?;

        let budget = self.effective_budget();
        let near_capacity = budget > 0 && bytes * 100 >= budget * NEAR_CAPACITY_PERCENT;
        if near_capacity {
            warn!(
                "event=persist_save module=persist status=ok bytes={bytes} budget={budget} near_capacity=true"
            );
        }
        Ok(SaveReport {
            bytes,
            near_capacity,
        })
    }

    /// Reads the snapshot, degrading to the empty default when missing or
    /// malformed.
    pub fn load(&self) -> PersistResult<StoreState> {
        let Some(payload) = self.storage.get(SNAPSHOT_KEY)? else {
            return Ok(StoreState::default());
        };
        match serde_json::from_slice::<StoreState>(&payload) {
            Ok(mut state) => {
                state.normalize();
                Ok(state)
            }
            Err(err) => {
                error!("event=persist_load module=persist status=error error={err}");
                Ok(StoreState::default())
            }
        }
    }

    /// Serialized snapshot size in bytes, for the pre-emptive warning path.
    pub fn estimate_size(&self, state: &StoreState) -> PersistResult<usize> {
        Ok(serde_json::to_vec(state)
            .map_err(PersistError::Encode)?
            .len())
    }

    pub fn save_fired_keys(&mut self, keys: &FiredKeySet) -> PersistResult<()> {
        let payload = serde_json::to_vec(keys).map_err(PersistError::Encode)?;
        self.write(FIRED_KEYS_KEY, &payload)
    }

    pub fn load_fired_keys(&self) -> PersistResult<FiredKeySet> {
        let Some(payload) = self.storage.get(FIRED_KEYS_KEY)? else {
            return Ok(FiredKeySet::default());
        };
        match serde_json::from_slice(&payload) {
            Ok(keys) => Ok(keys),
            Err(err) => {
                error!("event=persist_load module=persist status=error key=fired error={err}");
                Ok(FiredKeySet::default())
            }
        }
    }

    /// Direct substrate access for tests that corrupt or inspect raw
    /// payloads.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn effective_budget(&self) -> usize {
        self.storage
            .capacity_hint()
            .map_or(self.budget_bytes, |hint| hint.min(self.budget_bytes))
    }

    fn write(&mut self, key: &str, payload: &[u8]) -> PersistResult<()> {
        match self.storage.set(key, payload) {
            Ok(()) => Ok(()),
            Err(StorageError::QuotaExceeded {
                attempted_bytes,
                capacity_bytes,
            }) => {
                error!(
                    "event=persist_save module=persist status=error key={key} error=quota attempted={attempted_bytes} capacity={capacity_bytes}"
                );
                Err(PersistError::QuotaExceeded { attempted_bytes })
            }
            Err(err) => Err(PersistError::Storage(err)),
        }
    }
}
