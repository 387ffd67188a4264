// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe queue file.
//!
//! Saves write the whole snapshot to `<file>.tmp`, fsync it, and rename it
//! over `<file>`. The rename is the only step that makes new state visible,
//! so a crash mid-save leaves the previous file intact and at worst a stale
//! temp file, which [`QueueFile::load`] removes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tether_core::TetherError;
use tracing::{debug, error, warn};

use crate::store::MessageStore;

const MAX_BACKUP_ATTEMPTS: u32 = 8;

/// What [`QueueFile::load`] found on disk.
#[derive(Debug)]
pub struct LoadReport {
    pub store: MessageStore,
    /// A temp file from an interrupted save was deleted.
    pub removed_stale_tmp: bool,
    /// Where an unreadable queue file was moved to, if recovery happened.
    pub corrupt_backup: Option<PathBuf>,
}

/// Handle on the queue file and its temp sibling.
#[derive(Debug, Clone)]
pub struct QueueFile {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl QueueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tmp_path = sibling(&path, ".tmp");
        Self { path, tmp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// Load the store, recovering from a crash or a corrupt file.
    ///
    /// Only I/O failures reading an existing file are returned as errors.
    /// Bad content is backed up when possible and always replaced by an
    /// empty store.
    pub fn load(&self) -> Result<LoadReport, TetherError> {
        let removed_stale_tmp = self.remove_stale_tmp();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no queue file yet, starting empty");
                return Ok(LoadReport {
                    store: MessageStore::new(),
                    removed_stale_tmp,
                    corrupt_backup: None,
                });
            }
            Err(e) => return Err(TetherError::persistence(e)),
        };

        match MessageStore::restore(&bytes) {
            Ok(store) => {
                debug!(path = %self.path.display(), count = store.len(), "queue file loaded");
                Ok(LoadReport {
                    store,
                    removed_stale_tmp,
                    corrupt_backup: None,
                })
            }
            Err(e) => {
                let fault = TetherError::PersistenceCorruption {
                    path: self.path.clone(),
                    reason: e.to_string(),
                };
                let corrupt_backup = match self.backup_corrupt(&bytes) {
                    Ok(backup) => {
                        warn!(
                            error = %fault,
                            backup = %backup.display(),
                            "queue file unreadable, moved aside and starting empty"
                        );
                        Some(backup)
                    }
                    Err(backup_err) => {
                        error!(
                            error = %fault,
                            backup_error = %backup_err,
                            "queue file unreadable and could not be backed up, starting empty"
                        );
                        None
                    }
                };
                Ok(LoadReport {
                    store: MessageStore::new(),
                    removed_stale_tmp,
                    corrupt_backup,
                })
            }
        }
    }

    /// [`save`](Self::save) on tokio's blocking pool, keeping the fsync off
    /// the async workers.
    pub async fn save_async(&self, bytes: Vec<u8>) -> Result<(), TetherError> {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.save(&bytes))
            .await
            .map_err(|e| TetherError::Internal(format!("queue save task failed: {e}")))?
    }

    /// Atomically replace the queue file with `bytes`.
    pub fn save(&self, bytes: &[u8]) -> Result<(), TetherError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(TetherError::persistence)?;
        }

        let mut file = fs::File::create(&self.tmp_path).map_err(TetherError::persistence)?;
        file.write_all(bytes).map_err(TetherError::persistence)?;
        file.sync_all().map_err(TetherError::persistence)?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path).map_err(TetherError::persistence)
    }

    /// A temp file that cannot be removed is logged; the next save replaces it.
    fn remove_stale_tmp(&self) -> bool {
        match fs::remove_file(&self.tmp_path) {
            Ok(()) => {
                warn!(
                    path = %self.tmp_path.display(),
                    "removed temp file left by an interrupted save"
                );
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                error!(
                    path = %self.tmp_path.display(),
                    error = %e,
                    "could not remove stale temp file"
                );
                false
            }
        }
    }

    /// Move the unreadable file aside. If the stamped name is taken, the
    /// content is written under a numbered variant instead.
    fn backup_corrupt(&self, bytes: &[u8]) -> Result<PathBuf, TetherError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let backup = sibling(&self.path, &format!(".corrupt-{stamp}"));
        let first = match fs::rename(&self.path, &backup) {
            Ok(()) => return Ok(backup),
            Err(e) => e,
        };

        for n in 1..=MAX_BACKUP_ATTEMPTS {
            let candidate = sibling(&self.path, &format!(".corrupt-{stamp}-{n}"));
            if candidate.exists() {
                continue;
            }
            if fs::write(&candidate, bytes).is_ok() {
                return Ok(candidate);
            }
        }
        Err(TetherError::persistence(first))
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
