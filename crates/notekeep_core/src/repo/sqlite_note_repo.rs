//! SQLite implementation of `NoteRepository`.
//!
//! # Responsibility
//! - Map the `notes` table to `Note` values (0/1 integers to booleans).
//! - Run every statement on tokio's blocking pool, off the caller's task.
//! - Turn committed writes into change notifications for live queries.
//!
//! # Invariants
//! - Writes notify while still holding the connection lock, so a stream
//!   woken by a write re-queries after that write has committed.
//! - Timestamp bumps never move `updated_at` backwards:
//!   `updated_at = max(now, updated_at + 1)`.

use crate::clock::SharedClock;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, NoteStream, RepoError, RepoResult};
use async_stream::stream;
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task;
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    updated_at,
    is_pinned,
    is_archived
FROM notes";
const NOTE_ORDER_SQL: &str = "ORDER BY updated_at DESC, id ASC";
const ALL_FILTER: &str = "WHERE 1 = 1";
const PINNED_FILTER: &str = "WHERE is_pinned = 1 AND is_archived = 0";
const ARCHIVED_FILTER: &str = "WHERE is_archived = 1";
const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "content",
    "created_at",
    "updated_at",
    "is_pinned",
    "is_archived",
];
const CHANGE_BUFFER: usize = 32;

type SharedConnection = Arc<Mutex<Connection>>;

/// SQLite-backed note repository with live queries.
pub struct SqliteNoteRepository {
    conn: SharedConnection,
    changes: broadcast::Sender<()>,
    clock: SharedClock,
}

impl SqliteNoteRepository {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one produced by `db::migrations`.
    pub fn try_new(conn: Connection, clock: SharedClock) -> RepoResult<Self> {
        ensure_notes_table_ready(&conn)?;
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
            clock,
        })
    }

    fn observe<T, F>(&self, query_name: &'static str, query: F) -> NoteStream<T>
    where
        T: Send + 'static,
        F: Fn(&Connection) -> RepoResult<T> + Send + Sync + 'static,
    {
        let conn = Arc::clone(&self.conn);
        // Subscribe before the first query so no write slips in between.
        let mut changes = self.changes.subscribe();
        let query = Arc::new(query);

        Box::pin(stream! {
            loop {
                let run = Arc::clone(&query);
                let snapshot = with_connection(Arc::clone(&conn), move |conn| (*run)(conn)).await;
                let failed = snapshot.is_err();
                if let Err(err) = &snapshot {
                    warn!(
                        "event=note_query module=repo query={} status=error error={}",
                        query_name, err
                    );
                }
                yield snapshot;
                if failed || !wait_for_change(&mut changes).await {
                    break;
                }
            }
        })
    }

    /// Runs one write; `Ok(false)` when no row matched.
    async fn mutate<F>(&self, op: &'static str, id: NoteId, write: F) -> RepoResult<bool>
    where
        F: FnOnce(&Connection) -> RepoResult<usize> + Send + 'static,
    {
        let changes = self.changes.clone();
        let changed = with_connection(Arc::clone(&self.conn), move |conn| {
            let changed = write(conn)?;
            if changed > 0 {
                // Err only means there are no live queries right now.
                let _ = changes.send(());
            }
            Ok(changed)
        })
        .await;

        match changed {
            Ok(0) => {
                debug!("event=note_write module=repo op={op} status=noop id={id}");
                Ok(false)
            }
            Ok(_) => {
                debug!("event=note_write module=repo op={op} status=ok id={id}");
                Ok(true)
            }
            Err(err) => {
                warn!("event=note_write module=repo op={op} status=error id={id} error={err}");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    fn observe_all(&self) -> NoteStream<Vec<Note>> {
        self.observe("all", |conn| select_notes(conn, ALL_FILTER))
    }

    fn observe_pinned(&self) -> NoteStream<Vec<Note>> {
        self.observe("pinned", |conn| select_notes(conn, PINNED_FILTER))
    }

    fn observe_archived(&self) -> NoteStream<Vec<Note>> {
        self.observe("archived", |conn| select_notes(conn, ARCHIVED_FILTER))
    }

    fn observe_archived_count(&self) -> NoteStream<u64> {
        self.observe("archived_count", count_archived)
    }

    async fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        with_connection(Arc::clone(&self.conn), move |conn| {
            let mut stmt = conn.prepare_cached(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id.to_string()])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(parse_note_row(row)?));
            }
            Ok(None)
        })
        .await
    }

    async fn insert(&self, note: Note) -> RepoResult<()> {
        note.validate()?;
        let id = note.id;
        self.mutate("insert", id, move |conn| {
            let changed = conn.execute(
                "INSERT INTO notes (
                    id,
                    title,
                    content,
                    created_at,
                    updated_at,
                    is_pinned,
                    is_archived
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    note.id.to_string(),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.created_at,
                    note.updated_at,
                    bool_to_int(note.is_pinned),
                    bool_to_int(note.is_archived),
                ],
            )?;
            Ok(changed)
        })
        .await?;
        Ok(())
    }

    async fn update(&self, note: Note) -> RepoResult<bool> {
        note.validate()?;
        let id = note.id;
        self.mutate("update", id, move |conn| {
            let changed = conn.execute(
                "UPDATE notes
                 SET
                    title = ?2,
                    content = ?3,
                    updated_at = MAX(?4, updated_at + 1),
                    is_pinned = ?5,
                    is_archived = ?6
                 WHERE id = ?1;",
                params![
                    note.id.to_string(),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.updated_at,
                    bool_to_int(note.is_pinned),
                    bool_to_int(note.is_archived),
                ],
            )?;
            Ok(changed)
        })
        .await
    }

    async fn delete(&self, id: NoteId) -> RepoResult<()> {
        self.mutate("delete", id, move |conn| {
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
            Ok(changed)
        })
        .await?;
        Ok(())
    }

    async fn toggle_pin(&self, id: NoteId) -> RepoResult<()> {
        let now = self.clock.now_millis();
        self.mutate("toggle_pin", id, move |conn| {
            update_flags(conn, "is_pinned = 1 - is_pinned", id, now)
        })
        .await?;
        Ok(())
    }

    async fn archive(&self, id: NoteId) -> RepoResult<()> {
        let now = self.clock.now_millis();
        self.mutate("archive", id, move |conn| {
            update_flags(conn, "is_archived = 1", id, now)
        })
        .await?;
        Ok(())
    }

    async fn restore(&self, id: NoteId) -> RepoResult<()> {
        let now = self.clock.now_millis();
        self.mutate("restore", id, move |conn| {
            update_flags(conn, "is_archived = 0", id, now)
        })
        .await?;
        Ok(())
    }
}

async fn with_connection<T, F>(conn: SharedConnection, work: F) -> RepoResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
{
    task::spawn_blocking(move || {
        let guard = conn
            .lock()
            .map_err(|_| RepoError::Unavailable("connection lock poisoned".to_string()))?;
        work(&guard)
    })
    .await
    .map_err(|err| RepoError::Unavailable(format!("storage worker failed: {err}")))?
}

/// Waits for the next write notification.
///
/// Returns `false` once the repository is gone. Notifications already queued
/// behind the first one are drained, so a burst of writes costs one re-query.
async fn wait_for_change(changes: &mut broadcast::Receiver<()>) -> bool {
    match changes.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => return false,
    }
    loop {
        match changes.try_recv() {
            Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return true,
        }
    }
}

fn select_notes(conn: &Connection, filter: &str) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare_cached(&format!("{NOTE_SELECT_SQL} {filter} {NOTE_ORDER_SQL};"))?;
    let mut rows = stmt.query([])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn count_archived(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notes WHERE is_archived = 1;",
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative archived count `{count}`")))
}

fn update_flags(conn: &Connection, assignment: &str, id: NoteId, now: i64) -> RepoResult<usize> {
    let changed = conn.execute(
        &format!(
            "UPDATE notes
             SET
                {assignment},
                updated_at = MAX(?2, updated_at + 1)
             WHERE id = ?1;"
        ),
        params![id.to_string(), now],
    )?;
    Ok(changed)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    let note = Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_pinned: int_to_bool(row.get("is_pinned")?, "is_pinned")?,
        is_archived: int_to_bool(row.get("is_archived")?, "is_archived")?,
    };
    note.validate()?;
    Ok(note)
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in notes.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn ensure_notes_table_ready(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'notes'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(notes);")?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>(1)?);
    }
    for column in REQUIRED_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }
    Ok(())
}
