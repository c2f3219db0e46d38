//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notekeep_core` linkage.
//! - Print note counts and the most recent active notes for quick local checks.
//!
//! Usage: `notekeep_cli [DB_PATH]`. Without a path an empty in-memory
//! store is opened.

use futures::StreamExt;
use notekeep_core::{core_version, CoreConfig, NotesCore};
use std::process::ExitCode;

const LISTED_NOTES: usize = 10;
const PREVIEW_CHARS: usize = 60;

#[tokio::main]
async fn main() -> ExitCode {
    println!("notekeep_core version={}", core_version());

    let config = match std::env::args_os().nth(1) {
        Some(path) => CoreConfig::with_db_path(path),
        None => CoreConfig::default(),
    };
    match print_counts(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("notekeep_core error={message}");
            ExitCode::FAILURE
        }
    }
}

async fn print_counts(config: &CoreConfig) -> Result<(), String> {
    let core = NotesCore::open(config).map_err(|err| err.to_string())?;
    let use_cases = core.use_cases();

    let notes = first_snapshot(use_cases.get_notes.execute()).await?;
    let pinned = first_snapshot(use_cases.get_pinned_notes.execute()).await?;
    let archived = first_snapshot(use_cases.get_archived_count.execute()).await?;

    println!(
        "notes total={} pinned={} archived={}",
        notes.len(),
        pinned.len(),
        archived
    );
    for note in notes.iter().filter(|note| !note.is_archived).take(LISTED_NOTES) {
        println!(
            "note id={} pinned={} title={:?} preview={:?}",
            note.id,
            note.is_pinned,
            note.title,
            note.preview_text(PREVIEW_CHARS).unwrap_or_default()
        );
    }
    Ok(())
}

async fn first_snapshot<T>(mut stream: notekeep_core::NoteStream<T>) -> Result<T, String> {
    match stream.next().await {
        Some(result) => result.map_err(|err| err.to_string()),
        None => Err("query ended without a snapshot".to_string()),
    }
}
