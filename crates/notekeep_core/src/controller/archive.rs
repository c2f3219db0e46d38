//! Archive screen controller.
//!
//! # Responsibility
//! - Mirror the archived-notes query into state.
//! - Restore or permanently delete archived notes.
//!
//! # Invariants
//! - `archived_notes` only changes through the live subscription.

use crate::controller::effects::{EffectReceiver, EffectSender, DEFAULT_EFFECT_BUFFER};
use crate::controller::scope::ControllerScope;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::RepoResult;
use crate::usecase::{DeleteNote, GetArchivedNotes, NoteUseCases, RestoreNote};
use futures::StreamExt;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

const CONTROLLER_NAME: &str = "archive";

pub const NOTE_RESTORED_MESSAGE: &str = "Note restored";
pub const NOTE_DELETED_MESSAGE: &str = "Note deleted";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveState {
    pub archived_notes: Vec<Note>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveIntent {
    LoadArchivedNotes,
    RestoreNote(NoteId),
    DeleteNote(NoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEffect {
    ShowMessage(String),
    ShowError(String),
}

#[derive(Clone)]
pub struct ArchiveUseCases {
    pub get_archived_notes: GetArchivedNotes,
    pub restore_note: RestoreNote,
    pub delete_note: DeleteNote,
}

impl From<&NoteUseCases> for ArchiveUseCases {
    fn from(value: &NoteUseCases) -> Self {
        Self {
            get_archived_notes: value.get_archived_notes.clone(),
            restore_note: value.restore_note.clone(),
            delete_note: value.delete_note.clone(),
        }
    }
}

/// State holder for the archive screen.
///
/// Must be created inside a tokio runtime.
pub struct ArchiveController {
    inner: Arc<ArchiveInner>,
}

struct ArchiveInner {
    use_cases: ArchiveUseCases,
    state: watch::Sender<ArchiveState>,
    effects: EffectSender<ArchiveEffect>,
    scope: ControllerScope,
}

impl ArchiveController {
    pub fn new(use_cases: ArchiveUseCases) -> Self {
        Self::with_effect_buffer(use_cases, DEFAULT_EFFECT_BUFFER)
    }

    pub fn with_effect_buffer(use_cases: ArchiveUseCases, effect_buffer: usize) -> Self {
        let (state, _) = watch::channel(ArchiveState::default());
        let controller = Self {
            inner: Arc::new(ArchiveInner {
                use_cases,
                state,
                effects: EffectSender::new(CONTROLLER_NAME, effect_buffer),
                scope: ControllerScope::new(CONTROLLER_NAME),
            }),
        };
        controller.handle_intent(ArchiveIntent::LoadArchivedNotes);
        controller
    }

    pub fn handle_intent(&self, intent: ArchiveIntent) {
        if self.inner.scope.is_cancelled() {
            return;
        }
        debug!("event=intent module=controller controller={CONTROLLER_NAME} intent={intent:?}");

        match intent {
            ArchiveIntent::LoadArchivedNotes => self.inner.load_archived_notes(),
            ArchiveIntent::RestoreNote(id) => {
                let restore_note = self.inner.use_cases.restore_note.clone();
                self.inner.run_mutation(
                    "restore_note",
                    NOTE_RESTORED_MESSAGE,
                    async move { restore_note.execute(id).await },
                );
            }
            ArchiveIntent::DeleteNote(id) => {
                let delete_note = self.inner.use_cases.delete_note.clone();
                self.inner.run_mutation(
                    "delete_note",
                    NOTE_DELETED_MESSAGE,
                    async move { delete_note.execute(id).await },
                );
            }
        }
    }

    pub fn state(&self) -> ArchiveState {
        self.inner.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ArchiveState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_effects(&self) -> EffectReceiver<ArchiveEffect> {
        self.inner.effects.subscribe()
    }

    pub fn close(&self) {
        self.inner.scope.cancel();
        self.inner.effects.close();
    }
}

impl Drop for ArchiveController {
    fn drop(&mut self) {
        self.close();
    }
}

impl ArchiveInner {
    fn load_archived_notes(self: &Arc<Self>) {
        self.state.send_modify(|state| state.is_loading = true);

        let archived = self.use_cases.get_archived_notes.execute();
        let inner = Arc::clone(self);
        self.scope.resubscribe(async move {
            let mut archived = archived;
            while let Some(next) = archived.next().await {
                match next {
                    Ok(notes) => inner.state.send_modify(|state| {
                        state.archived_notes = notes;
                        state.is_loading = false;
                        state.error = None;
                    }),
                    Err(err) => {
                        warn!(
                            "event=archive_load module=controller controller={CONTROLLER_NAME} status=error error={err}"
                        );
                        let message = err.to_string();
                        inner.state.send_modify(|state| {
                            state.is_loading = false;
                            state.error = Some(message.clone());
                        });
                        inner.effects.emit(ArchiveEffect::ShowError(message));
                        break;
                    }
                }
            }
        });
    }

    fn run_mutation<F>(self: &Arc<Self>, action: &'static str, success: &'static str, operation: F)
    where
        F: Future<Output = RepoResult<()>> + Send + 'static,
    {
        let inner = Arc::clone(self);
        self.scope.launch(async move {
            match operation.await {
                Ok(()) => {
                    inner
                        .effects
                        .emit(ArchiveEffect::ShowMessage(success.to_string()));
                }
                Err(err) => {
                    warn!(
                        "event={action} module=controller controller={CONTROLLER_NAME} status=error error={err}"
                    );
                    inner.effects.emit(ArchiveEffect::ShowError(err.to_string()));
                }
            }
        });
    }
}
