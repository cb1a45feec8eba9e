use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::append_metadata;
use super::DumpFormat;
use super::HeapSnapshotter;
use super::LeakManifest;
use super::PathStyle;
use crate::constants::MANIFEST_SUFFIX;
use crate::file_io::create_target_file;
use crate::file_io::move_file;
use crate::file_io::sha256_hex_upper;
use crate::time::timestamp_millis;
use crate::Error;
use crate::Result;
use crate::RetentionManager;
use crate::SnapshotError;
use crate::WatchRegistry;

/// Paths of one complete dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpArtifacts {
    pub manifest: PathBuf,
    pub snapshot: PathBuf,
}

impl DumpArtifacts {
    /// `[manifest, snapshot]`, the order callers receive them in
    pub fn into_vec(self) -> Vec<PathBuf> {
        vec![self.manifest, self.snapshot]
    }
}

#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub dir: PathBuf,
    pub format: DumpFormat,
    pub style: PathStyle,
    /// Retention limit applied to `dir` once the dump is complete
    pub max_stored_files: usize,
}

/// Produces dumps and keeps their directory within its retention limit.
///
/// `Ok(None)` means the dump was abandoned after a logged failure; an `Err` is reserved for an
/// unusable target directory.
#[derive(Clone)]
pub struct DumpCoordinator {
    snapshotter: Arc<dyn HeapSnapshotter>,
    registry: Arc<WatchRegistry>,
    retention: RetentionManager,
    metadata_path: Option<PathBuf>,
    last_token: Arc<AtomicU64>,
}

impl fmt::Debug for DumpCoordinator {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DumpCoordinator")
            .field("metadata_path", &self.metadata_path)
            .field("last_token", &self.last_token.load(Ordering::Relaxed))
            .finish()
    }
}

impl DumpCoordinator {
    pub fn new(
        snapshotter: Arc<dyn HeapSnapshotter>,
        registry: Arc<WatchRegistry>,
        metadata_path: Option<PathBuf>,
    ) -> Self {
        Self {
            snapshotter,
            registry,
            retention: RetentionManager,
            metadata_path,
            last_token: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Dumps on the calling thread
    #[instrument(skip(self))]
    pub fn dump_sync(
        &self,
        request: &DumpRequest,
    ) -> Result<Option<DumpArtifacts>> {
        ensure_target_dir(&request.dir)?;
        let token = self.next_token();

        let snapshot = match request.format {
            DumpFormat::RawHeap => self.prepare_raw_heap(&request.dir, token).and_then(|path| {
                match self.snapshotter.dump_raw_heap_sync(&path) {
                    Ok(()) => Ok(path),
                    Err(e) => {
                        discard(&path);
                        Err(e)
                    }
                }
            }),
            DumpFormat::HeapSnapshot => self.dump_heap_snapshot(&request.dir, token),
        };
        let snapshot = match snapshot {
            Ok(path) => path,
            Err(e) => {
                error!(?e, "heap dump failed");
                return Ok(None);
            }
        };
        if request.format == DumpFormat::RawHeap {
            self.append_runtime_metadata(&snapshot);
        }

        Ok(self.complete(request, token, &snapshot))
    }

    /// Dumps without blocking the runtime: the snapshot is taken asynchronously and the
    /// checksum, manifest and retention work runs on the blocking pool
    #[instrument(skip(self))]
    pub async fn dump_async(
        &self,
        request: DumpRequest,
    ) -> Result<Option<DumpArtifacts>> {
        ensure_target_dir(&request.dir)?;
        let token = self.next_token();

        let snapshot = match request.format {
            DumpFormat::RawHeap => match self.prepare_raw_heap(&request.dir, token) {
                Ok(path) => match self.snapshotter.dump_raw_heap(path.clone()).await {
                    Ok(()) => Ok(path),
                    Err(e) => {
                        discard(&path);
                        Err(e)
                    }
                },
                Err(e) => Err(e),
            },
            DumpFormat::HeapSnapshot => self.dump_heap_snapshot(&request.dir, token),
        };
        let snapshot = match snapshot {
            Ok(path) => path,
            Err(e) => {
                error!(?e, "heap dump failed");
                return Ok(None);
            }
        };

        let this = self.clone();
        let completion = tokio::task::spawn_blocking(move || {
            if request.format == DumpFormat::RawHeap {
                this.append_runtime_metadata(&snapshot);
            }
            this.complete(&request, token, &snapshot)
        });
        match completion.await {
            Ok(artifacts) => Ok(artifacts),
            Err(e) => {
                error!(%e, "dump completion task failed");
                Ok(None)
            }
        }
    }

    /// Next timestamp token, strictly greater than every token handed out before
    fn next_token(&self) -> u64 {
        let now = timestamp_millis();
        let previous = self
            .last_token
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn prepare_raw_heap(
        &self,
        dir: &Path,
        token: u64,
    ) -> Result<PathBuf> {
        let path = dir.join(artifact_name(token, DumpFormat::RawHeap.suffix()));
        create_target_file(&path)?;
        Ok(path)
    }

    fn dump_heap_snapshot(
        &self,
        dir: &Path,
        token: u64,
    ) -> Result<PathBuf> {
        let name = artifact_name(token, DumpFormat::HeapSnapshot.suffix());
        let staged = self.snapshotter.dump_heap_snapshot(&name)?;
        if !staged.is_file() {
            return Err(SnapshotError::Missing(staged).into());
        }
        let target = dir.join(&name);
        if staged != target {
            move_file(&staged, &target)?;
        }
        Ok(target)
    }

    fn append_runtime_metadata(
        &self,
        snapshot: &Path,
    ) {
        if let Some(metadata) = &self.metadata_path {
            // A dump without its trailer is still usable
            if let Err(e) = append_metadata(snapshot, metadata) {
                warn!(?e, ?snapshot, "failed to append raw heap metadata");
            }
        }
    }

    /// Writes the manifest for `snapshot`, then enforces retention
    fn complete(
        &self,
        request: &DumpRequest,
        token: u64,
        snapshot: &Path,
    ) -> Option<DumpArtifacts> {
        let manifest = request.dir.join(artifact_name(token, MANIFEST_SUFFIX));
        if let Err(e) = self.write_manifest(request.format, snapshot, &manifest) {
            error!(?e, "failed to write leak list manifest, discarding dump");
            discard(&manifest);
            discard(snapshot);
            return None;
        }

        match self.retention.enforce(&request.dir, request.max_stored_files) {
            Ok(report) => {
                debug!(deleted = report.deleted.len(), failed = report.failed.len(), "retention pass")
            }
            Err(e) => {
                error!(?e, "retention pass failed");
                return None;
            }
        }

        info!(?manifest, ?snapshot, "heap dump complete");
        let reported = |path: &Path| match request.style {
            PathStyle::Absolute => path.to_path_buf(),
            PathStyle::FileName => path.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        Some(DumpArtifacts {
            manifest: reported(&manifest),
            snapshot: reported(snapshot),
        })
    }

    fn write_manifest(
        &self,
        format: DumpFormat,
        snapshot: &Path,
        manifest: &Path,
    ) -> Result<()> {
        let snapshot_hash = sha256_hex_upper(snapshot)?;
        LeakManifest::new(format, snapshot_hash, self.registry.current_list()).write_to(manifest)
    }
}

fn ensure_target_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        warn!(?dir, "dump directory does not exist");
        return Err(Error::InvalidParameter("path"));
    }
    Ok(())
}

fn artifact_name(
    token: u64,
    suffix: &str,
) -> String {
    format!("{token}.{suffix}")
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(?path, %e, "failed to remove partial dump artifact");
        }
    }
}
