//! Generated version fragments in the shared temp directory.
//!
//! Layout: `<temp_dir>/FlowVerInfo_<project>_<uuid>.<ext>`
//!
//! Several builds may share the directory. Names carry a random v4 UUID so
//! they never collide, and cleanup ignores files it cannot delete.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::FlowverConfig;
use crate::domain::error::{FlowverError, Result};

/// File name prefix of every generated fragment.
pub const ARTIFACT_PREFIX: &str = "FlowVerInfo_";

/// Owns the generated fragments from creation until a later cleanup pass.
#[derive(Debug, Clone)]
pub struct TempArtifactTracker {
    dir: PathBuf,
    retention: Duration,
}

impl TempArtifactTracker {
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    pub fn from_config(config: &FlowverConfig) -> Self {
        Self::new(config.temp_dir.clone(), config.temp_retention)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `path` looks like a fragment generated by this tool.
    pub fn is_artifact(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(ARTIFACT_PREFIX))
    }

    /// Delete fragments older than the retention window.
    ///
    /// Per-file failures (already deleted, locked by a sibling build) are
    /// logged and skipped. Returns the number of files removed.
    pub fn cleanup_all(&self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Cannot list temp directory");
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !Self::is_artifact(&path) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or(Duration::ZERO);
            if age < self.retention {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping temp file"),
            }
        }

        debug!(dir = %self.dir.display(), removed, "Cleaned up temp artifacts");
        removed
    }

    /// Write `content` to a new uniquely named fragment and return its path.
    pub fn register_and_write(
        &self,
        name_hint: &str,
        extension: &str,
        content: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let file_name = format!(
            "{ARTIFACT_PREFIX}{}_{}.{extension}",
            sanitize_hint(name_hint),
            Uuid::new_v4().simple()
        );
        let path = self.dir.join(file_name);

        // Atomic write: temp file in the same directory, then rename.
        let write = || -> std::io::Result<()> {
            let mut tmp = self.staging_file()?;
            tmp.write_all(content.as_bytes())?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|source| FlowverError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

impl TempArtifactTracker {
    /// Staging file for an atomic write. Carries the artifact prefix so a
    /// file orphaned by an aborted process is swept by a later cleanup.
    fn staging_file(&self) -> std::io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(ARTIFACT_PREFIX)
            .suffix(".partial")
            .tempfile_in(&self.dir)
    }
}

fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "project".to_string()
    } else {
        cleaned
    }
}
