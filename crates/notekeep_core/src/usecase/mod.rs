//! Use-case layer: one named operation per repository capability.
//!
//! # Responsibility
//! - Give each business action an independently testable unit.
//! - Keep controllers decoupled from the repository surface.
//!
//! # Invariants
//! - Use cases never bypass repository contracts.
//! - Only `SaveNote` carries branching policy; the rest are passthroughs.

pub mod mutate;
pub mod observe;
pub mod save_note;

pub use mutate::{ArchiveNote, DeleteNote, RestoreNote, TogglePinNote};
pub use observe::{GetArchivedCount, GetArchivedNotes, GetNoteById, GetNotes, GetPinnedNotes};
pub use save_note::{SaveNote, SaveNoteRequest, SaveOutcome};

use crate::clock::SharedClock;
use crate::repo::note_repo::SharedNoteRepository;

/// Every use case, constructed once from explicit dependencies.
#[derive(Clone)]
pub struct NoteUseCases {
    pub get_notes: GetNotes,
    pub get_pinned_notes: GetPinnedNotes,
    pub get_archived_notes: GetArchivedNotes,
    pub get_archived_count: GetArchivedCount,
    pub get_note_by_id: GetNoteById,
    pub save_note: SaveNote,
    pub delete_note: DeleteNote,
    pub toggle_pin_note: TogglePinNote,
    pub archive_note: ArchiveNote,
    pub restore_note: RestoreNote,
}

impl NoteUseCases {
    pub fn new(repo: SharedNoteRepository, clock: SharedClock) -> Self {
        Self {
            get_notes: GetNotes::new(repo.clone()),
            get_pinned_notes: GetPinnedNotes::new(repo.clone()),
            get_archived_notes: GetArchivedNotes::new(repo.clone()),
            get_archived_count: GetArchivedCount::new(repo.clone()),
            get_note_by_id: GetNoteById::new(repo.clone()),
            save_note: SaveNote::new(repo.clone(), clock),
            delete_note: DeleteNote::new(repo.clone()),
            toggle_pin_note: TogglePinNote::new(repo.clone()),
            archive_note: ArchiveNote::new(repo.clone()),
            restore_note: RestoreNote::new(repo),
        }
    }
}
