//! Home list controller.
//!
//! # Responsibility
//! - Fold the pinned, all-notes and archived-count queries into one state.
//! - Turn list intents into navigation effects or note mutations.
//!
//! # Invariants
//! - `normal_notes` holds notes that are neither pinned nor archived.
//! - Mutations never touch state directly; the live subscription does.
//! - Query failures stop loading, record `error` and emit `ShowError`.

use crate::controller::effects::{EffectReceiver, EffectSender, DEFAULT_EFFECT_BUFFER};
use crate::controller::scope::ControllerScope;
use crate::model::note::{Note, NoteId};
use crate::reactive::combine_latest3;
use crate::repo::note_repo::{RepoError, RepoResult};
use crate::usecase::{
    ArchiveNote, DeleteNote, GetArchivedCount, GetNotes, GetPinnedNotes, NoteUseCases,
    TogglePinNote,
};
use futures::StreamExt;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

const CONTROLLER_NAME: &str = "list";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub pinned_notes: Vec<Note>,
    pub normal_notes: Vec<Note>,
    pub archived_count: u64,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    LoadNotes,
    AddNote,
    EditNote(NoteId),
    DeleteNote(NoteId),
    TogglePin(NoteId),
    ArchiveNote(NoteId),
    NavigateToArchive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    /// `None` opens the editor on a new note.
    NavigateToDetails(Option<NoteId>),
    NavigateToArchive,
    ShowError(String),
}

/// Use cases the list screen depends on.
#[derive(Clone)]
pub struct ListUseCases {
    pub get_notes: GetNotes,
    pub get_pinned_notes: GetPinnedNotes,
    pub get_archived_count: GetArchivedCount,
    pub delete_note: DeleteNote,
    pub toggle_pin_note: TogglePinNote,
    pub archive_note: ArchiveNote,
}

impl From<&NoteUseCases> for ListUseCases {
    fn from(value: &NoteUseCases) -> Self {
        Self {
            get_notes: value.get_notes.clone(),
            get_pinned_notes: value.get_pinned_notes.clone(),
            get_archived_count: value.get_archived_count.clone(),
            delete_note: value.delete_note.clone(),
            toggle_pin_note: value.toggle_pin_note.clone(),
            archive_note: value.archive_note.clone(),
        }
    }
}

/// State holder for the home list screen.
///
/// Must be created inside a tokio runtime. Dropping it cancels the live
/// subscription and every in-flight mutation.
pub struct ListController {
    inner: Arc<ListInner>,
}

struct ListInner {
    use_cases: ListUseCases,
    state: watch::Sender<ListState>,
    effects: EffectSender<ListEffect>,
    scope: ControllerScope,
}

impl ListController {
    pub fn new(use_cases: ListUseCases) -> Self {
        Self::with_effect_buffer(use_cases, DEFAULT_EFFECT_BUFFER)
    }

    /// Creates the controller and starts loading immediately.
    pub fn with_effect_buffer(use_cases: ListUseCases, effect_buffer: usize) -> Self {
        let (state, _) = watch::channel(ListState::default());
        let controller = Self {
            inner: Arc::new(ListInner {
                use_cases,
                state,
                effects: EffectSender::new(CONTROLLER_NAME, effect_buffer),
                scope: ControllerScope::new(CONTROLLER_NAME),
            }),
        };
        controller.handle_intent(ListIntent::LoadNotes);
        controller
    }

    pub fn handle_intent(&self, intent: ListIntent) {
        if self.inner.scope.is_cancelled() {
            return;
        }
        debug!("event=intent module=controller controller={CONTROLLER_NAME} intent={intent:?}");

        let use_cases = &self.inner.use_cases;
        match intent {
            ListIntent::LoadNotes => self.inner.load_notes(),
            ListIntent::AddNote => {
                self.inner.effects.emit(ListEffect::NavigateToDetails(None));
            }
            ListIntent::EditNote(id) => {
                self.inner
                    .effects
                    .emit(ListEffect::NavigateToDetails(Some(id)));
            }
            ListIntent::DeleteNote(id) => {
                let delete_note = use_cases.delete_note.clone();
                self.inner
                    .run_mutation("delete_note", async move { delete_note.execute(id).await });
            }
            ListIntent::TogglePin(id) => {
                let toggle_pin = use_cases.toggle_pin_note.clone();
                self.inner
                    .run_mutation("toggle_pin", async move { toggle_pin.execute(id).await });
            }
            ListIntent::ArchiveNote(id) => {
                let archive_note = use_cases.archive_note.clone();
                self.inner
                    .run_mutation("archive_note", async move { archive_note.execute(id).await });
            }
            ListIntent::NavigateToArchive => {
                self.inner.effects.emit(ListEffect::NavigateToArchive);
            }
        }
    }

    /// Latest state snapshot.
    pub fn state(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every future state replacement.
    pub fn watch_state(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    /// Attaches the view's effect receiver, detaching any previous one.
    pub fn subscribe_effects(&self) -> EffectReceiver<ListEffect> {
        self.inner.effects.subscribe()
    }

    /// Cancels the subscription and in-flight work; pending effects are dropped.
    pub fn close(&self) {
        self.inner.scope.cancel();
        self.inner.effects.close();
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.close();
    }
}

impl ListInner {
    fn load_notes(self: &Arc<Self>) {
        self.state.send_modify(|state| state.is_loading = true);

        let combined = combine_latest3(
            self.use_cases.get_pinned_notes.execute(),
            self.use_cases.get_notes.execute(),
            self.use_cases.get_archived_count.execute(),
        );
        let inner = Arc::clone(self);
        self.scope.resubscribe(async move {
            let mut combined = Box::pin(combined);
            while let Some(next) = combined.next().await {
                match next {
                    Ok((pinned, all, archived_count)) => {
                        let normal = normal_notes(all);
                        inner.state.send_modify(|state| {
                            state.pinned_notes = pinned;
                            state.normal_notes = normal;
                            state.archived_count = archived_count;
                            state.is_loading = false;
                            state.error = None;
                        });
                    }
                    Err(err) => {
                        inner.fail_loading(&err);
                        break;
                    }
                }
            }
        });
    }

    fn fail_loading(&self, err: &RepoError) {
        warn!(
            "event=notes_load module=controller controller={} status=error error={}",
            CONTROLLER_NAME, err
        );
        let message = err.to_string();
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(message.clone());
        });
        self.effects.emit(ListEffect::ShowError(message));
    }

    fn run_mutation<F>(self: &Arc<Self>, action: &'static str, operation: F)
    where
        F: Future<Output = RepoResult<()>> + Send + 'static,
    {
        let inner = Arc::clone(self);
        self.scope.launch(async move {
            if let Err(err) = operation.await {
                warn!(
                    "event={} module=controller controller={} status=error error={}",
                    action, CONTROLLER_NAME, err
                );
                inner.effects.emit(ListEffect::ShowError(err.to_string()));
            }
        });
    }
}

/// Notes for the unpinned section of the list.
fn normal_notes(all: Vec<Note>) -> Vec<Note> {
    all.into_iter()
        .filter(|note| !note.is_pinned && !note.is_archived)
        .collect()
}
