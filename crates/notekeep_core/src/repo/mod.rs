//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note data access contract used by use cases.
//! - Isolate SQLite query details from controllers.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Mutations on unknown ids are silent no-ops, never errors.
//! - Every content-changing write wakes all live query streams.

pub mod note_repo;
pub mod sqlite_note_repo;
