//! Bounded retention of dump artifacts.
//!
//! Artifact names end in `<digits>.<suffix>`; the digits are the creation timestamp and decide
//! age. Files without a parsable timestamp count as the oldest.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;

use crate::constants::ARTIFACT_SUFFIXES;
use crate::Result;
use crate::StorageError;

/// Outcome of one retention pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Artifacts found in the directory before deletion
    pub scanned: usize,
    pub deleted: Vec<PathBuf>,
    /// Artifacts that could not be removed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug)]
struct Artifact {
    timestamp: u64,
    name: String,
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionManager;

impl RetentionManager {
    /// Deletes the oldest artifacts in `dir` until at most `max_files` remain.
    ///
    /// A failed deletion is logged and reported without stopping the pass.
    #[instrument(skip(self))]
    pub fn enforce(
        &self,
        dir: &Path,
        max_files: usize,
    ) -> Result<RetentionReport> {
        let mut artifacts = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| StorageError::PathError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(StorageError::IoError)?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if artifact_suffix(&name).is_none() {
                continue;
            }
            artifacts.push(Artifact {
                timestamp: parse_artifact_timestamp(&name),
                name,
                path: entry.path(),
            });
        }

        let mut report = RetentionReport {
            scanned: artifacts.len(),
            ..Default::default()
        };
        if artifacts.len() <= max_files {
            debug!(scanned = report.scanned, "no artifacts to delete");
            return Ok(report);
        }

        artifacts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.name.cmp(&b.name)));
        let split_point = artifacts.len() - max_files;
        for artifact in &artifacts[..split_point] {
            match fs::remove_file(&artifact.path) {
                Ok(()) => {
                    info!(path = ?artifact.path, "deleted old dump artifact");
                    report.deleted.push(artifact.path.clone());
                }
                Err(e) => {
                    error!(path = ?artifact.path, %e, "failed to delete old dump artifact");
                    report.failed.push((artifact.path.clone(), e.to_string()));
                }
            }
        }
        Ok(report)
    }
}

fn artifact_suffix(name: &str) -> Option<&'static str> {
    ARTIFACT_SUFFIXES.into_iter().find(|suffix| {
        name.strip_suffix(suffix)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// Trailing digits before the artifact suffix, or 0 when absent
pub fn parse_artifact_timestamp(name: &str) -> u64 {
    let Some(suffix) = artifact_suffix(name) else {
        return 0;
    };
    let stem = &name[..name.len() - suffix.len() - 1];
    let digits_start = stem
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    stem[digits_start..].parse().unwrap_or(0)
}
