//! Read-side use cases (live queries and point lookup).

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteStream, RepoResult, SharedNoteRepository};

/// Live stream of every note.
#[derive(Clone)]
pub struct GetNotes {
    repo: SharedNoteRepository,
}

impl GetNotes {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub fn execute(&self) -> NoteStream<Vec<Note>> {
        self.repo.observe_all()
    }
}

/// Live stream of pinned, non-archived notes.
#[derive(Clone)]
pub struct GetPinnedNotes {
    repo: SharedNoteRepository,
}

impl GetPinnedNotes {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub fn execute(&self) -> NoteStream<Vec<Note>> {
        self.repo.observe_pinned()
    }
}

/// Live stream of archived notes.
#[derive(Clone)]
pub struct GetArchivedNotes {
    repo: SharedNoteRepository,
}

impl GetArchivedNotes {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub fn execute(&self) -> NoteStream<Vec<Note>> {
        self.repo.observe_archived()
    }
}

/// Live count of archived notes.
#[derive(Clone)]
pub struct GetArchivedCount {
    repo: SharedNoteRepository,
}

impl GetArchivedCount {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub fn execute(&self) -> NoteStream<u64> {
        self.repo.observe_archived_count()
    }
}

/// Point-in-time lookup of one note.
#[derive(Clone)]
pub struct GetNoteById {
    repo: SharedNoteRepository,
}

impl GetNoteById {
    pub fn new(repo: SharedNoteRepository) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_by_id(id).await
    }
}
