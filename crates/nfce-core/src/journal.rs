//! Append-only scan journal.
//!
//! Optional per-session audit log of what was scanned and how each
//! submission ended (`SCAN` / `OK` / `ERR` lines with UTC timestamps).
//! When no directory is configured the handle is a no-op, so callers never
//! branch on whether journaling is enabled.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::Utc;

/// Thread-safe handle to an append-only journal file.
pub type JournalHandle = Arc<Mutex<Option<File>>>;

/// Open (or create) `{dir}/{session_id}.log` and return a shared handle.
///
/// `None` dir, or any I/O failure, yields a silent no-op handle; journaling
/// is best-effort and never blocks scanning.
pub fn open_journal(dir: Option<&Path>, session_id: &str) -> JournalHandle {
    let file = dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{session_id}.log")))
            .ok()
    });
    Arc::new(Mutex::new(file))
}

/// Write a timestamped line to the journal (if enabled).
pub fn record(handle: &JournalHandle, tag: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
            let _ = writeln!(file, "[{ts}] {tag}: {data}");
            let _ = file.flush();
        }
    }
}
