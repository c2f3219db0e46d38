//! Create-or-update use case.
//!
//! # Invariants
//! - Without an id a new note is inserted with `created_at == updated_at`.
//! - With an id, `id` and `created_at` are preserved and `updated_at`
//!   strictly increases.
//! - A missing target is a silent no-op, including one deleted between
//!   the lookup and the write. `Updated` always means a row was written.
//! - `updated_at` never moves backwards, even when a flag change commits
//!   between the lookup and the write.

use crate::clock::SharedClock;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{RepoResult, SharedNoteRepository};
use log::debug;

/// Draft fields submitted by the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveNoteRequest {
    /// `None` creates a new note.
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_archived: bool,
}

/// What a save actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(NoteId),
    Updated(NoteId),
    /// Target id no longer exists; nothing was written.
    Skipped(NoteId),
}

#[derive(Clone)]
pub struct SaveNote {
    repo: SharedNoteRepository,
    clock: SharedClock,
}

impl SaveNote {
    pub fn new(repo: SharedNoteRepository, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    pub async fn execute(&self, request: SaveNoteRequest) -> RepoResult<SaveOutcome> {
        let now = self.clock.now_millis();
        let SaveNoteRequest {
            id,
            title,
            content,
            is_pinned,
            is_archived,
        } = request;

        let Some(id) = id else {
            let mut note = Note::new(title, content, now);
            note.is_pinned = is_pinned;
            note.is_archived = is_archived;
            let id = note.id;
            self.repo.insert(note).await?;
            debug!("event=note_save module=usecase status=created id={id}");
            return Ok(SaveOutcome::Created(id));
        };

        let Some(existing) = self.repo.get_by_id(id).await? else {
            debug!("event=note_save module=usecase status=skipped id={id}");
            return Ok(SaveOutcome::Skipped(id));
        };

        let updated = Note {
            title,
            content,
            is_pinned,
            is_archived,
            updated_at: now.max(existing.updated_at + 1),
            ..existing
        };
        if !self.repo.update(updated).await? {
            debug!("event=note_save module=usecase status=skipped reason=deleted_during_save id={id}");
            return Ok(SaveOutcome::Skipped(id));
        }
        debug!("event=note_save module=usecase status=updated id={id}");
        Ok(SaveOutcome::Updated(id))
    }
}
