//! Entity store: canonical collections and atomic mutation operations.
//!
//! # Responsibility
//! - Own the lists, per-list task and archive sequences, and the
//!   notification log.
//! - Enforce input validation and index safety for every mutation.
//!
//! # Invariants
//! - Index 0 of an active sequence is the most recently added task.
//! - A task lives in exactly one sequence at a time.
//! - Removing a list detaches its data instead of erasing it, so callers
//!   can stage an undo entry first.

mod entity_store;
mod state;

pub use entity_store::EntityStore;
pub use state::StoreState;

use crate::model::list::ListId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected user input. Recovered locally; no state change happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyListName,
    ListNameTooLong { length: usize, max: usize },
    DuplicateListName(String),
    UnknownList(ListId),
    EmptyTaskText,
    TaskTextTooLong { length: usize, max: usize },
    DuplicateTask { text: String },
    /// Expired tasks can only be archived or deleted, never completed.
    TaskExpired,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyListName => write!(f, "list name must not be blank"),
            Self::ListNameTooLong { length, max } => {
                write!(f, "list name has {length} characters, maximum is {max}")
            }
            Self::DuplicateListName(name) => write!(f, "list name already in use: `{name}`"),
            Self::UnknownList(id) => write!(f, "list not found: {id}"),
            Self::EmptyTaskText => write!(f, "task text must not be blank"),
            Self::TaskTextTooLong { length, max } => {
                write!(f, "task text has {length} characters, maximum is {max}")
            }
            Self::DuplicateTask { text } => {
                write!(f, "task with identical text and due date exists: `{text}`")
            }
            Self::TaskExpired => write!(f, "expired task cannot be completed"),
        }
    }
}

impl Error for ValidationError {}

/// Stale index addressing: the sequence changed under the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of range for sequence of length {}",
            self.index, self.len
        )
    }
}

impl Error for IndexError {}

/// Store-level operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ValidationError),
    Index(IndexError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Index(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IndexError> for StoreError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}
