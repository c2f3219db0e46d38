mod common;

use async_trait::async_trait;
use common::{open_repo, FixedClock, StepClock};
use notekeep_core::usecase::SaveNote;
use notekeep_core::{
    Note, NoteId, NoteRepository, NoteStream, RepoResult, SaveNoteRequest, SaveOutcome,
    SharedClock, SharedNoteRepository, SqliteNoteRepository,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Write that lands between `SaveNote`'s lookup and its update.
#[derive(Clone, Copy)]
enum Interleave {
    TogglePin(usize),
    Delete,
}

/// Repository that commits `Interleave` right after every `get_by_id`.
struct InterleavingRepo {
    inner: Arc<SqliteNoteRepository>,
    interleave: Interleave,
}

#[async_trait]
impl NoteRepository for InterleavingRepo {
    fn observe_all(&self) -> NoteStream<Vec<Note>> {
        self.inner.observe_all()
    }

    fn observe_pinned(&self) -> NoteStream<Vec<Note>> {
        self.inner.observe_pinned()
    }

    fn observe_archived(&self) -> NoteStream<Vec<Note>> {
        self.inner.observe_archived()
    }

    fn observe_archived_count(&self) -> NoteStream<u64> {
        self.inner.observe_archived_count()
    }

    async fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let found = self.inner.get_by_id(id).await?;
        match self.interleave {
            Interleave::TogglePin(times) => {
                for _ in 0..times {
                    self.inner.toggle_pin(id).await?;
                }
            }
            Interleave::Delete => self.inner.delete(id).await?,
        }
        Ok(found)
    }

    async fn insert(&self, note: Note) -> RepoResult<()> {
        self.inner.insert(note).await
    }

    async fn update(&self, note: Note) -> RepoResult<bool> {
        self.inner.update(note).await
    }

    async fn delete(&self, id: NoteId) -> RepoResult<()> {
        self.inner.delete(id).await
    }

    async fn toggle_pin(&self, id: NoteId) -> RepoResult<()> {
        self.inner.toggle_pin(id).await
    }

    async fn archive(&self, id: NoteId) -> RepoResult<()> {
        self.inner.archive(id).await
    }

    async fn restore(&self, id: NoteId) -> RepoResult<()> {
        self.inner.restore(id).await
    }
}

async fn seed_with_interleave(
    interleave: Interleave,
) -> (SaveNote, Arc<SqliteNoteRepository>, NoteId) {
    let clock: SharedClock = Arc::new(FixedClock(1_000));
    let inner = open_repo(clock.clone());
    let seeded = Note::new("base", "body", 1_000);
    let id = seeded.id;
    inner.insert(seeded).await.unwrap();
    let repo: SharedNoteRepository = Arc::new(InterleavingRepo {
        inner: inner.clone(),
        interleave,
    });
    (SaveNote::new(repo, clock), inner, id)
}

fn save_note_with(start: i64, step: i64) -> (SaveNote, SharedNoteRepository) {
    let clock: SharedClock = StepClock::starting_at(start, step);
    let repo: SharedNoteRepository = open_repo(clock.clone());
    (SaveNote::new(repo.clone(), clock), repo)
}

fn draft(title: &str) -> SaveNoteRequest {
    SaveNoteRequest {
        title: title.to_string(),
        content: format!("{title} body"),
        ..SaveNoteRequest::default()
    }
}

#[tokio::test]
async fn create_assigns_fresh_id_and_equal_timestamps() {
    let (save_note, repo) = save_note_with(1_000, 10);

    let SaveOutcome::Created(id) = save_note.execute(draft("new")).await.unwrap() else {
        panic!("expected a created outcome");
    };
    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "new");
    assert_eq!(stored.created_at, 1_000);
    assert_eq!(stored.updated_at, 1_000);
    assert!(!stored.is_pinned);
    assert!(!stored.is_archived);
}

#[tokio::test]
async fn repeated_creates_never_share_an_id() {
    let (save_note, _repo) = save_note_with(1_000, 1);
    let mut ids = HashSet::new();
    for index in 0..20 {
        match save_note.execute(draft(&format!("n{index}"))).await.unwrap() {
            SaveOutcome::Created(id) => assert!(ids.insert(id)),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[tokio::test]
async fn update_keeps_identity_and_advances_updated_at() {
    let (save_note, repo) = save_note_with(1_000, 10);
    let SaveOutcome::Created(id) = save_note.execute(draft("v1")).await.unwrap() else {
        panic!("expected a created outcome");
    };

    let outcome = save_note
        .execute(SaveNoteRequest {
            id: Some(id),
            title: "v2".to_string(),
            content: "changed".to_string(),
            is_pinned: true,
            is_archived: false,
        })
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Updated(id));

    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.title, "v2");
    assert_eq!(stored.content, "changed");
    assert!(stored.is_pinned);
    assert_eq!(stored.created_at, 1_000);
    assert!(stored.updated_at > 1_000);
}

#[tokio::test]
async fn update_advances_even_when_clock_stands_still() {
    let (save_note, repo) = save_note_with(1_000, 0);
    let SaveOutcome::Created(id) = save_note.execute(draft("v1")).await.unwrap() else {
        panic!("expected a created outcome");
    };

    let mut previous = 1_000;
    for _ in 0..3 {
        save_note
            .execute(SaveNoteRequest {
                id: Some(id),
                ..draft("again")
            })
            .await
            .unwrap();
        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert!(stored.updated_at > previous);
        previous = stored.updated_at;
    }
}

#[tokio::test]
async fn saving_a_missing_id_is_skipped_without_writing() {
    let (save_note, repo) = save_note_with(1_000, 10);
    let ghost = Uuid::new_v4();

    let outcome = save_note
        .execute(SaveNoteRequest {
            id: Some(ghost),
            ..draft("ghost")
        })
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Skipped(ghost));
    assert!(repo.get_by_id(ghost).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_leave_one_whole_version() {
    let (save_note, repo) = save_note_with(1_000, 1);
    let SaveOutcome::Created(id) = save_note.execute(draft("base")).await.unwrap() else {
        panic!("expected a created outcome");
    };

    let save_note = Arc::new(save_note);
    let mut handles = Vec::new();
    for writer in 0..8 {
        let save_note = Arc::clone(&save_note);
        handles.push(tokio::spawn(async move {
            save_note
                .execute(SaveNoteRequest {
                    id: Some(id),
                    title: format!("title-{writer}"),
                    content: format!("content-{writer}"),
                    is_pinned: writer % 2 == 0,
                    is_archived: false,
                })
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), SaveOutcome::Updated(id));
    }

    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    let writer = stored
        .title
        .strip_prefix("title-")
        .expect("title written by one of the writers");
    assert_eq!(stored.content, format!("content-{writer}"));
    let writer: usize = writer.parse().unwrap();
    assert_eq!(stored.is_pinned, writer % 2 == 0);
    assert_eq!(stored.created_at, 1_000);
}

#[tokio::test]
async fn flag_writes_during_save_never_move_updated_at_backwards() {
    let (save_note, inner, id) = seed_with_interleave(Interleave::TogglePin(5)).await;

    let outcome = save_note
        .execute(SaveNoteRequest {
            id: Some(id),
            ..draft("edited")
        })
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Updated(id));

    // Five toggles moved the row to 1_005 before the save wrote.
    let stored = inner.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "edited");
    assert_eq!(stored.updated_at, 1_006);
    assert_eq!(stored.created_at, 1_000);
}

#[tokio::test]
async fn note_deleted_during_save_is_reported_as_skipped() {
    let (save_note, inner, id) = seed_with_interleave(Interleave::Delete).await;

    let outcome = save_note
        .execute(SaveNoteRequest {
            id: Some(id),
            ..draft("too late")
        })
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Skipped(id));
    assert!(inner.get_by_id(id).await.unwrap().is_none());
}
