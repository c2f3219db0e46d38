//! Core domain logic for NoteKeep.
//! This crate is the single source of truth for note invariants and
//! screen state.

pub mod app;
pub mod clock;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod reactive;
pub mod repo;
pub mod usecase;

pub use app::{CoreError, NotesCore};
pub use clock::{Clock, SharedClock, SystemClock};
pub use config::{ConfigError, CoreConfig, LogConfig};
pub use controller::{
    ArchiveController, ArchiveEffect, ArchiveIntent, ArchiveState, DetailController, DetailEffect,
    DetailIntent, DetailState, EffectReceiver, ListController, ListEffect, ListIntent, ListState,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use repo::note_repo::{
    NoteRepository, NoteStream, RepoError, RepoResult, SharedNoteRepository,
};
pub use repo::sqlite_note_repo::SqliteNoteRepository;
pub use usecase::{NoteUseCases, SaveNoteRequest, SaveOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
