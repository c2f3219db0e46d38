//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the canonical note record shared by every screen.
//! - Keep lifecycle helpers (timestamps, previews) next to the data.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is permanent; archive is the only "soft" state.

pub mod note;
