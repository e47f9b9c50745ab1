//! Key-value storage substrate contract and in-memory backend.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Substrate-level failure.
#[derive(Debug)]
pub enum StorageError {
    /// The backing store refused the write for capacity reasons.
    QuotaExceeded {
        attempted_bytes: usize,
        capacity_bytes: usize,
    },
    Sqlite(rusqlite::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                attempted_bytes,
                capacity_bytes,
            } => write!(
                f,
                "write of {attempted_bytes} bytes exceeds capacity of {capacity_bytes} bytes"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::QuotaExceeded { .. } => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Byte-oriented key-value store beneath the persistence adapter.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    /// Best-effort capacity signal; `None` when the backend has no
    /// meaningful budget of its own.
    fn capacity_hint(&self) -> Option<usize>;
}

/// Map-backed store with an optional byte capacity.
///
/// The capacity limit makes it the test double for storage-full behavior.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Vec<u8>>,
    capacity_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(_, value)| value.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if let Some(capacity_bytes) = self.capacity_bytes {
            let used = self.used_bytes_excluding(key);
            if used + value.len() > capacity_bytes {
                return Err(StorageError::QuotaExceeded {
                    attempted_bytes: value.len(),
                    capacity_bytes,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn capacity_hint(&self) -> Option<usize> {
        self.capacity_bytes
    }
}
