//! Staging of fragments into temporary source files.
//!
//! A [`StagedFile`] is a guard: the file is deleted when the guard is dropped,
//! whatever happened between staging and the drop (compile failure, parser
//! panic, early return).

use super::extractor::Fragment;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Files that mark the root of a workspace.
const WORKSPACE_MARKERS: &[&str] = &[crate::config::CONFIG_FILE, ".git"];

const DEFAULT_REMOVE_ATTEMPTS: usize = 20;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to write staged fragment {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to remove staged fragment {path} after {attempts} attempts: {source}")]
    Remove {
        path: PathBuf,
        attempts: usize,
        source: io::Error,
    },
}

/// The filesystem collaborator used for staging.
pub trait StagingFs {
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;
    fn delete_file(&self, path: &Path) -> io::Result<()>;
}

/// [`StagingFs`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl StagingFs for RealFs {
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Nearest ancestor of `start` (inclusive) containing a workspace marker.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| WORKSPACE_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}

/// Directory fragments of `document` are staged in.
///
/// An explicit directory wins, then the workspace root, then the directory
/// holding the document.
pub fn staging_dir_for(explicit: Option<&Path>, document: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let parent = document
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    find_workspace_root(parent).unwrap_or_else(|| parent.to_path_buf())
}

/// Writes fragments as `snippet-<id>.<extension>` under one directory.
pub struct FragmentStager<'a> {
    dir: PathBuf,
    extension: String,
    fs: &'a dyn StagingFs,
    remove_attempts: usize,
    retry_delay: Duration,
}

impl<'a> FragmentStager<'a> {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, fs: &'a dyn StagingFs) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            fs,
            remove_attempts: DEFAULT_REMOVE_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the removal retry policy.
    pub fn with_retry(mut self, attempts: usize, delay: Duration) -> Self {
        self.remove_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Staging path for fragment `id`. Distinct ids never collide within a pass.
    pub fn path_for(&self, id: usize) -> PathBuf {
        self.dir.join(format!("snippet-{id}.{}", self.extension))
    }

    /// Write `fragment` to its staging path.
    ///
    /// The guard exists before the write, so a partially written file is
    /// removed even when the write fails.
    pub fn stage(&self, fragment: &Fragment) -> Result<StagedFile<'a>, StagingError> {
        let staged = StagedFile {
            path: self.path_for(fragment.id),
            fs: self.fs,
            remove_attempts: self.remove_attempts,
            retry_delay: self.retry_delay,
        };

        self.fs
            .write_file(&staged.path, &fragment.text)
            .map_err(|source| StagingError::Write {
                path: staged.path.clone(),
                source,
            })?;

        log::debug!("Staged fragment {} at {}", fragment.id, staged.path.display());
        Ok(staged)
    }
}

/// A staged fragment file, removed on drop.
#[must_use = "the staged file is removed as soon as the guard is dropped"]
pub struct StagedFile<'a> {
    path: PathBuf,
    fs: &'a dyn StagingFs,
    remove_attempts: usize,
    retry_delay: Duration,
}

impl StagedFile<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file, retrying up to the configured number of attempts.
    /// A file that is already gone counts as removed.
    fn remove(&self) -> Result<(), StagingError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fs.delete_file(&self.path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(source) if attempt >= self.remove_attempts => {
                    return Err(StagingError::Remove {
                        path: self.path.clone(),
                        attempts: attempt,
                        source,
                    });
                }
                Err(e) => {
                    log::warn!("Couldn't remove {} (attempt {attempt}): {e}", self.path.display());
                    thread::sleep(self.retry_delay);
                }
            }
        }
    }
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        match self.remove() {
            Ok(()) => log::debug!("Removed staged fragment {}", self.path.display()),
            Err(e) => log::error!("{e}"),
        }
    }
}
