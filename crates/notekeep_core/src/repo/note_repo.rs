//! Note repository contract.
//!
//! # Responsibility
//! - Declare live (reactive) queries, point lookups and mutations over notes.
//! - Define the repository error shared by every implementation.
//!
//! # Invariants
//! - `observe_*` streams emit a fresh snapshot after every committed write
//!   that may change their result, in commit order.
//! - A stream ends right after yielding its first error.
//! - `delete`, `update`, `toggle_pin`, `archive` and `restore` are no-ops for
//!   unknown ids. `insert` always creates.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteValidationError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Live query result stream.
pub type NoteStream<T> = BoxStream<'static, RepoResult<T>>;

/// Shared repository handle used by use cases.
pub type SharedNoteRepository = Arc<dyn NoteRepository>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    /// Persisted row could not be mapped back to a `Note`.
    InvalidData(String),
    /// Storage cannot currently serve requests (poisoned lock, dead worker).
    Unavailable(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Unavailable(message) => write!(f, "note storage unavailable: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note CRUD and live queries.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes, store order.
    fn observe_all(&self) -> NoteStream<Vec<Note>>;
    /// Notes with `is_pinned` set and `is_archived` clear.
    fn observe_pinned(&self) -> NoteStream<Vec<Note>>;
    /// Notes with `is_archived` set.
    fn observe_archived(&self) -> NoteStream<Vec<Note>>;
    /// Number of archived notes.
    fn observe_archived_count(&self) -> NoteStream<u64>;

    /// Point-in-time lookup; not reactive.
    async fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;

    async fn insert(&self, note: Note) -> RepoResult<()>;
    /// Replaces title, content and flags. Keeps `created_at`; `updated_at`
    /// becomes `max(note.updated_at, stored + 1)`. `Ok(false)` when the id
    /// is unknown.
    async fn update(&self, note: Note) -> RepoResult<bool>;
    async fn delete(&self, id: NoteId) -> RepoResult<()>;
    async fn toggle_pin(&self, id: NoteId) -> RepoResult<()>;
    async fn archive(&self, id: NoteId) -> RepoResult<()>;
    async fn restore(&self, id: NoteId) -> RepoResult<()>;
}
