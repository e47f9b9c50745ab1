//! Snapshot persistence over a key-value storage substrate.
//!
//! # Responsibility
//! - Serialize the store snapshot and the fired-key set into durable local
//!   storage.
//! - Enforce the storage size budget with a pre-emptive warning.
//!
//! # Invariants
//! - The adapter is the sole caller of the storage substrate.
//! - A missing or malformed load degrades to the empty default; startup
//!   never crashes on prior state.

mod adapter;
mod sqlite;
mod storage;

pub use adapter::{
    PersistenceAdapter, SaveReport, FIRED_KEYS_KEY, SNAPSHOT_KEY, STORAGE_BUDGET_BYTES,
};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, Storage, StorageError};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Persistence-layer failure.
#[derive(Debug)]
pub enum PersistError {
    /// The substrate rejected the write for capacity reasons. The caller
    /// degrades to in-memory-only for this write; it is not a crash.
    QuotaExceeded { attempted_bytes: usize },
    /// Substrate I/O failure.
    Storage(StorageError),
    /// Snapshot could not be encoded.
    Encode(serde_json::Error),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { attempted_bytes } => {
                write!(f, "storage rejected write of {attempted_bytes} bytes")
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::QuotaExceeded { .. } => None,
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::QuotaExceeded {
                attempted_bytes, ..
            } => Self::QuotaExceeded { attempted_bytes },
            other => Self::Storage(other),
        }
    }
}
