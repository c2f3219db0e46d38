//! Single-note mutations. Unknown ids are silent no-ops.

use crate::model::note::NoteId;
use crate::repo::note_repo::{RepoResult, SharedNoteRepository};

/// Permanently removes a note.
#[derive(Clone)]
pub struct DeleteNote {
    repo: SharedNoteRepository,
}

impl DeleteNote {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: NoteId) -> RepoResult<()> {
        self.repo.delete(id).await
    }
}

/// Flips `is_pinned` and bumps `updated_at`.
#[derive(Clone)]
pub struct TogglePinNote {
    repo: SharedNoteRepository,
}

impl TogglePinNote {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: NoteId) -> RepoResult<()> {
        self.repo.toggle_pin(id).await
    }
}

/// Sets `is_archived` and bumps `updated_at`.
#[derive(Clone)]
pub struct ArchiveNote {
    repo: SharedNoteRepository,
}

impl ArchiveNote {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: NoteId) -> RepoResult<()> {
        self.repo.archive(id).await
    }
}

/// Clears `is_archived` and bumps `updated_at`, even when already clear.
#[derive(Clone)]
pub struct RestoreNote {
    repo: SharedNoteRepository,
}

impl RestoreNote {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: NoteId) -> RepoResult<()> {
        self.repo.restore(id).await
    }
}
