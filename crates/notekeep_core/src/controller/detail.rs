//! Note editor controller.
//!
//! # Responsibility
//! - Hold the editable draft of one note (new or existing).
//! - Validate and persist the draft, then ask the view to navigate back.
//!
//! # Invariants
//! - Title, content and pin edits are local until `SaveNote`.
//! - A blank draft never reaches the repository.
//! - Loading an id that no longer exists falls back to an empty new draft.
//! - `is_saving` is true only while a save is in flight.

use crate::controller::effects::{EffectReceiver, EffectSender, DEFAULT_EFFECT_BUFFER};
use crate::controller::scope::ControllerScope;
use crate::model::note::NoteId;
use crate::usecase::{ArchiveNote, GetNoteById, NoteUseCases, SaveNote, SaveNoteRequest, SaveOutcome};
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::watch;

const CONTROLLER_NAME: &str = "detail";

/// Error shown when saving a note without title and content.
pub const EMPTY_NOTE_MESSAGE: &str = "Title and content cannot be empty";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    /// `None` while editing a note that has never been saved.
    pub note_id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_saving: bool,
}

impl DetailState {
    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailIntent {
    LoadNote(Option<NoteId>),
    UpdateTitle(String),
    UpdateContent(String),
    SaveNote,
    ArchiveNote,
    TogglePin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEffect {
    NavigateBack,
    ShowError(String),
}

#[derive(Clone)]
pub struct DetailUseCases {
    pub get_note_by_id: GetNoteById,
    pub save_note: SaveNote,
    pub archive_note: ArchiveNote,
}

impl From<&NoteUseCases> for DetailUseCases {
    fn from(value: &NoteUseCases) -> Self {
        Self {
            get_note_by_id: value.get_note_by_id.clone(),
            save_note: value.save_note.clone(),
            archive_note: value.archive_note.clone(),
        }
    }
}

/// State holder for the note editor.
///
/// Must be created inside a tokio runtime.
pub struct DetailController {
    inner: Arc<DetailInner>,
}

struct DetailInner {
    use_cases: DetailUseCases,
    state: watch::Sender<DetailState>,
    effects: EffectSender<DetailEffect>,
    scope: ControllerScope,
}

impl DetailController {
    pub fn new(use_cases: DetailUseCases, initial_note_id: Option<NoteId>) -> Self {
        Self::with_effect_buffer(use_cases, initial_note_id, DEFAULT_EFFECT_BUFFER)
    }

    /// Creates the editor; with an initial id the note is loaded right away.
    pub fn with_effect_buffer(
        use_cases: DetailUseCases,
        initial_note_id: Option<NoteId>,
        effect_buffer: usize,
    ) -> Self {
        let (state, _) = watch::channel(DetailState {
            note_id: initial_note_id,
            ..DetailState::default()
        });
        let controller = Self {
            inner: Arc::new(DetailInner {
                use_cases,
                state,
                effects: EffectSender::new(CONTROLLER_NAME, effect_buffer),
                scope: ControllerScope::new(CONTROLLER_NAME),
            }),
        };
        if initial_note_id.is_some() {
            controller.handle_intent(DetailIntent::LoadNote(initial_note_id));
        }
        controller
    }

    pub fn handle_intent(&self, intent: DetailIntent) {
        if self.inner.scope.is_cancelled() {
            return;
        }
        debug!(
            "event=intent module=controller controller={CONTROLLER_NAME} intent={}",
            intent_label(&intent)
        );

        match intent {
            DetailIntent::LoadNote(Some(id)) => self.inner.load_note(id),
            DetailIntent::LoadNote(None) => {}
            DetailIntent::UpdateTitle(title) => {
                self.inner.state.send_modify(|state| state.title = title);
            }
            DetailIntent::UpdateContent(content) => {
                self.inner.state.send_modify(|state| state.content = content);
            }
            DetailIntent::TogglePin => {
                self.inner
                    .state
                    .send_modify(|state| state.is_pinned = !state.is_pinned);
            }
            DetailIntent::SaveNote => self.inner.save_note(),
            DetailIntent::ArchiveNote => self.inner.archive_note(),
        }
    }

    pub fn state(&self) -> DetailState {
        self.inner.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<DetailState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_effects(&self) -> EffectReceiver<DetailEffect> {
        self.inner.effects.subscribe()
    }

    pub fn close(&self) {
        self.inner.scope.cancel();
        self.inner.effects.close();
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        self.close();
    }
}

impl DetailInner {
    fn load_note(self: &Arc<Self>, id: NoteId) {
        let inner = Arc::clone(self);
        let get_note_by_id = self.use_cases.get_note_by_id.clone();
        self.scope.launch(async move {
            match get_note_by_id.execute(id).await {
                Ok(Some(note)) => inner.state.send_modify(|state| {
                    state.note_id = Some(note.id);
                    state.title = note.title;
                    state.content = note.content;
                    state.is_pinned = note.is_pinned;
                    state.is_archived = note.is_archived;
                }),
                Ok(None) => {
                    debug!(
                        "event=note_load module=controller controller={CONTROLLER_NAME} status=not_found id={id}"
                    );
                    inner.state.send_modify(|state| {
                        *state = DetailState {
                            is_saving: state.is_saving,
                            ..DetailState::default()
                        };
                    });
                }
                Err(err) => {
                    warn!(
                        "event=note_load module=controller controller={CONTROLLER_NAME} status=error id={id} error={err}"
                    );
                    inner.effects.emit(DetailEffect::ShowError(err.to_string()));
                }
            }
        });
    }

    fn save_note(self: &Arc<Self>) {
        let draft = self.state.borrow().clone();
        if draft.is_blank() {
            self.effects
                .emit(DetailEffect::ShowError(EMPTY_NOTE_MESSAGE.to_string()));
            return;
        }

        self.state.send_modify(|state| state.is_saving = true);
        let request = SaveNoteRequest {
            id: draft.note_id,
            title: draft.title,
            content: draft.content,
            is_pinned: draft.is_pinned,
            is_archived: draft.is_archived,
        };
        let inner = Arc::clone(self);
        let save_note = self.use_cases.save_note.clone();
        self.scope.launch(async move {
            match save_note.execute(request).await {
                Ok(outcome) => {
                    inner.state.send_modify(|state| {
                        state.is_saving = false;
                        if let SaveOutcome::Created(id) = outcome {
                            state.note_id = Some(id);
                        }
                    });
                    inner.effects.emit(DetailEffect::NavigateBack);
                }
                Err(err) => {
                    warn!(
                        "event=note_save module=controller controller={CONTROLLER_NAME} status=error error={err}"
                    );
                    inner.state.send_modify(|state| state.is_saving = false);
                    inner.effects.emit(DetailEffect::ShowError(err.to_string()));
                }
            }
        });
    }

    fn archive_note(self: &Arc<Self>) {
        let Some(id) = self.state.borrow().note_id else {
            debug!("event=note_archive module=controller controller={CONTROLLER_NAME} status=noop reason=unsaved");
            return;
        };

        let inner = Arc::clone(self);
        let archive_note = self.use_cases.archive_note.clone();
        self.scope.launch(async move {
            match archive_note.execute(id).await {
                Ok(()) => {
                    inner.effects.emit(DetailEffect::NavigateBack);
                }
                Err(err) => {
                    warn!(
                        "event=note_archive module=controller controller={CONTROLLER_NAME} status=error id={id} error={err}"
                    );
                    inner.effects.emit(DetailEffect::ShowError(err.to_string()));
                }
            }
        });
    }
}

// Draft text stays out of the logs.
fn intent_label(intent: &DetailIntent) -> &'static str {
    match intent {
        DetailIntent::LoadNote(_) => "load_note",
        DetailIntent::UpdateTitle(_) => "update_title",
        DetailIntent::UpdateContent(_) => "update_content",
        DetailIntent::SaveNote => "save_note",
        DetailIntent::ArchiveNote => "archive_note",
        DetailIntent::TogglePin => "toggle_pin",
    }
}
