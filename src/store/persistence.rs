//! Low-level file operations for the state store.
//!
//! Writes go to a unique temporary sibling, are fsynced, and then renamed
//! over the target, so a crash mid-write leaves either the old file or the
//! new one intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::naming::tmp_file_name;
use crate::model::{describe_file_state_problem, FileTrackingState};

/// Result of reading one state file from disk.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// No file at the path.
    Missing,
    /// File parsed and passed structural validation.
    Valid(FileTrackingState),
    /// File exists but is unreadable JSON or structurally malformed.
    Invalid(String),
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(tmp_file_name(&file_name))
}

/// Write `contents` to `path` atomically.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_path_for(path);

    let result = async {
        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(contents).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);
        fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}

/// Read, parse and validate a state file.
///
/// Only I/O failures other than "not found" are errors; malformed content
/// is reported as [`ReadOutcome::Invalid`] so the caller can recover.
pub(crate) async fn read_state(path: &Path) -> std::io::Result<ReadOutcome> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ReadOutcome::Missing),
        Err(e) => return Err(e),
    };

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => return Ok(ReadOutcome::Invalid(format!("unparseable JSON: {e}"))),
    };

    if let Some(problem) = describe_file_state_problem(&value) {
        return Ok(ReadOutcome::Invalid(problem));
    }

    match serde_json::from_value(value) {
        Ok(state) => Ok(ReadOutcome::Valid(state)),
        Err(e) => Ok(ReadOutcome::Invalid(format!("failed to decode state: {e}"))),
    }
}

/// Copy `from` over `to` atomically. Returns `false` if `from` is missing.
pub(crate) async fn restore_copy(from: &Path, to: &Path) -> std::io::Result<bool> {
    let bytes = match fs::read(from).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    write_atomic(to, &bytes).await?;
    Ok(true)
}

/// Remove a file, treating "not found" as success.
pub(crate) async fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
