//! Note domain model.
//!
//! # Responsibility
//! - Define the immutable-by-replacement note value.
//! - Validate timestamp invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never reassigned.
//! - `created_at <= updated_at`.
//! - `is_pinned` and `is_archived` are independent flags.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// One short text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped on every mutation.
    pub updated_at: i64,
    pub is_pinned: bool,
    pub is_archived: bool,
}

/// Model-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `updated_at` is earlier than `created_at`.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "note updated_at {updated_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Creates a fresh note with a generated id and both timestamps at `now_ms`.
    ///
    /// # Invariants
    /// - `created_at == updated_at` for new notes.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, content, now_ms)
    }

    /// Creates a note with a caller-provided id.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at: now_ms,
            updated_at: now_ms,
            is_pinned: false,
            is_archived: false,
        }
    }

    /// Checks invariants that must hold before a write.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Single-line excerpt of `content` for list cards.
    ///
    /// Whitespace runs collapse to one space; text longer than `max_chars`
    /// is cut and suffixed with `...`. Returns `None` for blank content.
    pub fn preview_text(&self, max_chars: usize) -> Option<String> {
        let normalized = WHITESPACE_RE.replace_all(self.content.trim(), " ");
        if normalized.is_empty() {
            return None;
        }
        if normalized.chars().count() <= max_chars {
            return Some(normalized.into_owned());
        }
        let mut preview: String = normalized.chars().take(max_chars).collect();
        preview.push_str("...");
        Some(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteValidationError};

    #[test]
    fn new_note_has_equal_timestamps_and_default_flags() {
        let note = Note::new("title", "", 42);
        assert_eq!(note.created_at, 42);
        assert_eq!(note.updated_at, 42);
        assert!(!note.is_pinned);
        assert!(!note.is_archived);
        assert!(note.validate().is_ok());
    }

    #[test]
    fn validate_rejects_updated_before_created() {
        let mut note = Note::new("t", "c", 100);
        note.updated_at = 99;
        assert_eq!(
            note.validate(),
            Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: 100,
                updated_at: 99,
            })
        );
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        let note = Note::new("t", "  first line\n\n second\tline  ", 1);
        assert_eq!(note.preview_text(100).as_deref(), Some("first line second line"));
        assert_eq!(note.preview_text(5).as_deref(), Some("first..."));
    }

    #[test]
    fn preview_is_none_for_blank_content() {
        let note = Note::new("t", " \n\t ", 1);
        assert_eq!(note.preview_text(10), None);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let note = Note::new("t", "c", 7);
        let json = serde_json::to_value(&note).expect("note should serialize");
        assert_eq!(json["createdAt"], 7);
        assert_eq!(json["isPinned"], false);
    }
}
