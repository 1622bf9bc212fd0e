//! Durable per-file tracking state.
//!
//! # Layout
//!
//! ```text
//! <state_dir>/
//!   ├── <sha256(source_path)>.json       - current state
//!   ├── <sha256(source_path)>.json.bak   - state before the last save
//!   └── <...>.json.<uuid>.tmp            - in-flight write (transient)
//! ```
//!
//! # Failure semantics
//!
//! - Saving state that fails validation is [`TrackError::InvalidState`].
//! - A corrupt primary file is replaced by its `.bak` once; if that also
//!   fails, the load is [`TrackError::CorruptState`].
//! - Listing skips corrupt entries instead of failing.
//! - The backup copy before a save is best-effort; a failed copy is logged
//!   and the save continues.
//!
//! Operations on the same source path must not overlap. Nothing here locks.

pub mod naming;
mod persistence;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use self::naming::{backup_file_name, is_primary_state_file, is_scheme_file, state_file_name};
use self::persistence::{read_state, remove_if_exists, restore_copy, write_atomic, ReadOutcome};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackError};
use crate::model::{
    describe_file_state_problem, AppState, FileTrackingState, TrackingStatus, APP_STATE_VERSION,
};

/// File-backed store of [`FileTrackingState`] records keyed by source path.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Directory where state files are stored.
    dir: PathBuf,
    /// Whether to copy the previous file to `.bak` before overwriting.
    backups: bool,
}

impl StateStore {
    /// Creates a store rooted at `dir`. The directory is created on the
    /// first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            backups: true,
        }
    }

    /// Creates a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Config`] if no state directory can be resolved.
    pub fn from_config(config: &TrackerConfig, override_dir: Option<&Path>) -> Result<Self> {
        let dir = config.resolve_state_dir(override_dir)?;
        Ok(Self::new(dir).with_backups(config.backups))
    }

    /// Enable or disable the backup copy made before each overwrite.
    #[must_use]
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups = enabled;
        self
    }

    /// Returns the state directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the primary state file path for a source path.
    #[must_use]
    pub fn state_file_path(&self, source_path: &str) -> PathBuf {
        self.dir.join(state_file_name(source_path))
    }

    /// Returns the backup file path for a source path.
    #[must_use]
    pub fn backup_file_path(&self, source_path: &str) -> PathBuf {
        self.dir.join(backup_file_name(source_path))
    }

    // =========================================================================
    // Core CRUD
    // =========================================================================

    /// Validate, back up, stamp and atomically write `state`.
    ///
    /// On success `state.updated_at` holds the time written to disk.
    ///
    /// # Errors
    ///
    /// - [`TrackError::InvalidState`] if `state` fails structural validation
    /// - [`TrackError::Io`] if the directory or file cannot be written
    pub async fn save_file_state(&self, state: &mut FileTrackingState) -> Result<()> {
        let value = serde_json::to_value(&*state)?;
        if let Some(reason) = describe_file_state_problem(&value) {
            return Err(TrackError::invalid_state(&state.source_path, reason));
        }

        fs::create_dir_all(&self.dir).await?;

        let path = self.state_file_path(&state.source_path);
        if self.backups {
            self.backup_before_write(&state.source_path, &path).await;
        }

        state.updated_at = Utc::now();
        let json = serde_json::to_string_pretty(&*state)?;
        write_atomic(&path, json.as_bytes()).await?;

        debug!(
            "Saved tracking state for {} ({} items) to {}",
            state.source_path,
            state.items.len(),
            path.display()
        );
        Ok(())
    }

    async fn backup_before_write(&self, source_path: &str, path: &Path) {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return;
        }
        let backup = self.backup_file_path(source_path);
        if let Err(e) = fs::copy(path, &backup).await {
            warn!(
                "Failed to back up {} before save, continuing without backup: {}",
                path.display(),
                e
            );
        }
    }

    /// Load state for `source_path`.
    ///
    /// Returns `Ok(None)` if the file has never been tracked. A corrupt
    /// primary file triggers one restore from `.bak`.
    ///
    /// # Errors
    ///
    /// - [`TrackError::CorruptState`] if the primary and backup are both bad
    /// - [`TrackError::PathCollision`] if the file belongs to another path
    /// - [`TrackError::Io`] for unexpected read failures
    pub async fn load_file_state(&self, source_path: &str) -> Result<Option<FileTrackingState>> {
        let path = self.state_file_path(source_path);

        let reason = match read_state(&path).await? {
            ReadOutcome::Missing => return Ok(None),
            ReadOutcome::Valid(state) => return check_owner(source_path, &path, state).map(Some),
            ReadOutcome::Invalid(reason) => reason,
        };

        warn!(
            "Tracking state for {} is corrupt ({}), attempting restore from backup",
            source_path, reason
        );

        let backup = self.backup_file_path(source_path);
        match restore_copy(&backup, &path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("No backup available for {}", source_path);
                return Err(TrackError::corrupt_state(source_path, path));
            }
            Err(e) => {
                warn!("Failed to restore backup {}: {}", backup.display(), e);
                return Err(TrackError::corrupt_state(source_path, path));
            }
        }

        match read_state(&path).await? {
            ReadOutcome::Valid(state) => {
                info!("Restored tracking state for {} from backup", source_path);
                check_owner(source_path, &path, state).map(Some)
            }
            ReadOutcome::Invalid(reason) => {
                warn!("Backup for {} is also corrupt: {}", source_path, reason);
                Err(TrackError::corrupt_state(source_path, path))
            }
            ReadOutcome::Missing => Err(TrackError::corrupt_state(source_path, path)),
        }
    }

    /// Delete state and backup for `source_path`. Deleting untracked state
    /// succeeds.
    pub async fn delete_file_state(&self, source_path: &str) -> Result<()> {
        let removed = remove_if_exists(&self.state_file_path(source_path)).await?;
        remove_if_exists(&self.backup_file_path(source_path)).await?;
        if removed {
            debug!("Deleted tracking state for {}", source_path);
        }
        Ok(())
    }

    /// Check if state exists for `source_path` without loading it.
    pub async fn has_tracking_state(&self, source_path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.state_file_path(source_path)).await?)
    }

    /// List the source paths of every readable state file, sorted.
    ///
    /// Unreadable or malformed entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] only if the directory itself cannot be read.
    pub async fn list_tracked_files(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_primary_state_file(&name) {
                continue;
            }
            match read_state(&entry.path()).await {
                Ok(ReadOutcome::Valid(state)) => paths.push(state.source_path),
                Ok(ReadOutcome::Missing) => {}
                Ok(ReadOutcome::Invalid(reason)) => {
                    warn!("Skipping unreadable state file {}: {}", name, reason);
                }
                Err(e) => warn!("Skipping state file {}: {}", name, e),
            }
        }

        paths.sort();
        Ok(paths)
    }

    // =========================================================================
    // Convenience operations
    // =========================================================================

    /// Load state for `source_path`, creating and persisting an empty one
    /// seeded with `content_hash` if it is not tracked yet.
    pub async fn get_or_create_file_state(
        &self,
        source_path: &str,
        content_hash: &str,
    ) -> Result<FileTrackingState> {
        if let Some(state) = self.load_file_state(source_path).await? {
            return Ok(state);
        }

        let mut state = FileTrackingState::new(source_path, content_hash);
        self.save_file_state(&mut state).await?;
        info!("Started tracking {}", source_path);
        Ok(state)
    }

    /// Upsert one item's status. Returns `None` if the file is untracked.
    pub async fn update_item_status(
        &self,
        source_path: &str,
        item_id: &str,
        status: TrackingStatus,
    ) -> Result<Option<FileTrackingState>> {
        self.update_item_statuses(source_path, [(item_id.to_string(), status)])
            .await
    }

    /// Upsert several item statuses with a single save. Returns `None` if
    /// the file is untracked.
    pub async fn update_item_statuses<I>(
        &self,
        source_path: &str,
        updates: I,
    ) -> Result<Option<FileTrackingState>>
    where
        I: IntoIterator<Item = (String, TrackingStatus)>,
    {
        let Some(mut state) = self.load_file_state(source_path).await? else {
            return Ok(None);
        };

        for (item_id, status) in updates {
            state.set_status(&item_id, status);
        }

        self.save_file_state(&mut state).await?;
        Ok(Some(state))
    }

    /// Replace the stored content hash. Returns `None` if the file is
    /// untracked.
    pub async fn update_content_hash(
        &self,
        source_path: &str,
        new_hash: &str,
    ) -> Result<Option<FileTrackingState>> {
        let Some(mut state) = self.load_file_state(source_path).await? else {
            return Ok(None);
        };

        state.content_hash = new_hash.to_string();
        self.save_file_state(&mut state).await?;
        Ok(Some(state))
    }

    /// Load every tracked file. Entries that fail to load are omitted.
    pub async fn load_all_file_states(&self) -> Result<HashMap<String, FileTrackingState>> {
        let mut states = HashMap::new();
        for source_path in self.list_tracked_files().await? {
            match self.load_file_state(&source_path).await {
                Ok(Some(state)) => {
                    states.insert(source_path, state);
                }
                Ok(None) => {}
                Err(e) => warn!("Omitting {} from batch load: {}", source_path, e),
            }
        }
        Ok(states)
    }

    /// Assemble the logical [`AppState`] from every tracked file.
    pub async fn load_app_state(&self) -> Result<AppState> {
        Ok(AppState {
            version: APP_STATE_VERSION,
            files: self.load_all_file_states().await?,
        })
    }

    /// Delete every state, backup and temp file. Returns how many primary
    /// state files were removed.
    pub async fn clear_all(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_scheme_file(&name) {
                continue;
            }
            if remove_if_exists(&entry.path()).await? && is_primary_state_file(&name) {
                removed += 1;
            }
        }

        info!("Cleared {} tracked files from {}", removed, self.dir.display());
        Ok(removed)
    }
}

fn check_owner(
    source_path: &str,
    file: &Path,
    state: FileTrackingState,
) -> Result<FileTrackingState> {
    if state.source_path == source_path {
        Ok(state)
    } else {
        Err(TrackError::PathCollision {
            requested: source_path.to_string(),
            stored: state.source_path,
            file: file.to_path_buf(),
        })
    }
}
