//! Composition root.
//!
//! # Responsibility
//! - Open storage and logging from a `CoreConfig`.
//! - Hand out controllers wired to one shared repository and clock.
//!
//! # Invariants
//! - Config is validated before any file or logger is touched.
//! - Every controller created by one `NotesCore` observes the same store.

use crate::clock::{SharedClock, SystemClock};
use crate::config::{ConfigError, CoreConfig};
use crate::controller::{
    ArchiveController, ArchiveUseCases, DetailController, DetailUseCases, ListController,
    ListUseCases,
};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::init_logging;
use crate::model::note::NoteId;
use crate::repo::note_repo::{RepoError, SharedNoteRepository};
use crate::repo::sqlite_note_repo::SqliteNoteRepository;
use crate::usecase::NoteUseCases;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum CoreError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Repo(RepoError),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for CoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Opened notes core: use cases plus controller factories.
#[derive(Clone)]
pub struct NotesCore {
    use_cases: NoteUseCases,
    effect_buffer: usize,
}

impl NotesCore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    /// - `CoreError::Config` for invalid settings.
    /// - `CoreError::Logging`, `CoreError::Db` or `CoreError::Repo` when a
    ///   resource cannot be acquired.
    pub fn open(config: &CoreConfig) -> Result<Self, CoreError> {
        config.validate()?;
        if let Some(log) = &config.log {
            init_logging(&log.level, &log.dir).map_err(CoreError::Logging)?;
        }

        let conn = match &config.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        let clock: SharedClock = Arc::new(SystemClock);
        let repo = SqliteNoteRepository::try_new(conn, clock.clone())?;

        info!(
            "event=core_open module=app status=ok storage={} effect_buffer={}",
            if config.db_path.is_some() { "file" } else { "memory" },
            config.effect_buffer
        );
        Ok(Self::from_parts(
            Arc::new(repo),
            clock,
            config.effect_buffer,
        ))
    }

    /// Builds a core over an existing repository, e.g. a test double.
    pub fn from_parts(repo: SharedNoteRepository, clock: SharedClock, effect_buffer: usize) -> Self {
        Self {
            use_cases: NoteUseCases::new(repo, clock),
            effect_buffer: effect_buffer.max(1),
        }
    }

    pub fn use_cases(&self) -> &NoteUseCases {
        &self.use_cases
    }

    /// Must be called inside a tokio runtime.
    pub fn list_controller(&self) -> ListController {
        ListController::with_effect_buffer(ListUseCases::from(&self.use_cases), self.effect_buffer)
    }

    /// Must be called inside a tokio runtime.
    pub fn detail_controller(&self, note_id: Option<NoteId>) -> DetailController {
        DetailController::with_effect_buffer(
            DetailUseCases::from(&self.use_cases),
            note_id,
            self.effect_buffer,
        )
    }

    /// Must be called inside a tokio runtime.
    pub fn archive_controller(&self) -> ArchiveController {
        ArchiveController::with_effect_buffer(
            ArchiveUseCases::from(&self.use_cases),
            self.effect_buffer,
        )
    }
}
