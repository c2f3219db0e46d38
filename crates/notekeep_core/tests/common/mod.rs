#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use notekeep_core::db::open_db_in_memory;
use notekeep_core::{
    Clock, Note, NoteId, NoteRepository, NoteStream, RepoError, RepoResult, SharedClock,
    SharedNoteRepository, SqliteNoteRepository,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const WAIT: Duration = Duration::from_secs(5);

/// Clock that advances by `step` on every read.
pub struct StepClock {
    next: AtomicI64,
    step: i64,
}

impl StepClock {
    pub fn starting_at(start: i64, step: i64) -> Arc<Self> {
        Arc::new(Self {
            next: AtomicI64::new(start),
            step,
        })
    }
}

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// Clock frozen at one instant.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub fn open_repo(clock: SharedClock) -> Arc<SqliteNoteRepository> {
    let conn = open_db_in_memory().unwrap();
    Arc::new(SqliteNoteRepository::try_new(conn, clock).unwrap())
}

pub fn shared_repo() -> (SharedNoteRepository, SharedClock) {
    let clock: SharedClock = StepClock::starting_at(1_000, 10);
    let repo: SharedNoteRepository = open_repo(clock.clone());
    (repo, clock)
}

pub fn note(title: &str, created_at: i64) -> Note {
    Note::new(title, format!("{title} body"), created_at)
}

pub async fn wait_for_state<S, F>(rx: &mut watch::Receiver<S>, predicate: F) -> S
where
    S: Clone,
    F: FnMut(&S) -> bool,
{
    tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("state did not reach the expected value in time")
        .expect("controller state channel closed")
        .clone()
}

pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(WAIT, future)
        .await
        .expect("operation timed out")
}

/// Repository whose every operation fails with `Unavailable`.
pub struct FailingRepo {
    pub message: &'static str,
}

impl FailingRepo {
    pub fn shared(message: &'static str) -> SharedNoteRepository {
        Arc::new(Self { message })
    }

    fn failure<T: Send + 'static>(&self) -> NoteStream<T> {
        Box::pin(stream::iter(vec![Err(RepoError::Unavailable(
            self.message.to_string(),
        ))]))
    }

    fn error(&self) -> RepoError {
        RepoError::Unavailable(self.message.to_string())
    }
}

#[async_trait]
impl NoteRepository for FailingRepo {
    fn observe_all(&self) -> NoteStream<Vec<Note>> {
        self.failure()
    }

    fn observe_pinned(&self) -> NoteStream<Vec<Note>> {
        self.failure()
    }

    fn observe_archived(&self) -> NoteStream<Vec<Note>> {
        self.failure()
    }

    fn observe_archived_count(&self) -> NoteStream<u64> {
        self.failure()
    }

    async fn get_by_id(&self, _id: NoteId) -> RepoResult<Option<Note>> {
        Err(self.error())
    }

    async fn insert(&self, _note: Note) -> RepoResult<()> {
        Err(self.error())
    }

    async fn update(&self, _note: Note) -> RepoResult<bool> {
        Err(self.error())
    }

    async fn delete(&self, _id: NoteId) -> RepoResult<()> {
        Err(self.error())
    }

    async fn toggle_pin(&self, _id: NoteId) -> RepoResult<()> {
        Err(self.error())
    }

    async fn archive(&self, _id: NoteId) -> RepoResult<()> {
        Err(self.error())
    }

    async fn restore(&self, _id: NoteId) -> RepoResult<()> {
        Err(self.error())
    }
}

/// Real store whose live queries fail until `recover` is called.
pub struct RecoveringRepo {
    inner: Arc<SqliteNoteRepository>,
    healthy: AtomicBool,
}

impl RecoveringRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: open_repo(StepClock::starting_at(1_000, 10)),
            healthy: AtomicBool::new(false),
        })
    }

    pub fn recover(&self) {
        self.healthy.store(true, Ordering::SeqCst);
    }

    fn live<T: Send + 'static>(&self, query: impl FnOnce() -> NoteStream<T>) -> NoteStream<T> {
        if self.healthy.load(Ordering::SeqCst) {
            return query();
        }
        Box::pin(stream::iter(vec![Err(RepoError::Unavailable(
            "warming up".to_string(),
        ))]))
    }
}

#[async_trait]
impl NoteRepository for RecoveringRepo {
    fn observe_all(&self) -> NoteStream<Vec<Note>> {
        self.live(|| self.inner.observe_all())
    }

    fn observe_pinned(&self) -> NoteStream<Vec<Note>> {
        self.live(|| self.inner.observe_pinned())
    }

    fn observe_archived(&self) -> NoteStream<Vec<Note>> {
        self.live(|| self.inner.observe_archived())
    }

    fn observe_archived_count(&self) -> NoteStream<u64> {
        self.live(|| self.inner.observe_archived_count())
    }

    async fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.inner.get_by_id(id).await
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
