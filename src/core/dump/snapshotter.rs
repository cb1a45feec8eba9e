use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::constants::HEAP_SNAPSHOT_SUFFIX;
use crate::constants::RAW_HEAP_SUFFIX;
use crate::Result;

/// Native heap snapshot primitives provided by the host runtime
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HeapSnapshotter: Send + Sync {
    /// Writes a raw heap dump into the already created file at `path`
    fn dump_raw_heap_sync(
        &self,
        path: &Path,
    ) -> Result<()>;

    /// Asynchronous variant of [`HeapSnapshotter::dump_raw_heap_sync`]
    async fn dump_raw_heap(
        &self,
        path: PathBuf,
    ) -> Result<()>;

    /// Writes a text heap snapshot named `file_name` into the host's staging area and returns
    /// the path it was written to
    fn dump_heap_snapshot(
        &self,
        file_name: &str,
    ) -> Result<PathBuf>;
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Binary raw heap; used by automatic dumps
    RawHeap,
    /// Text heap snapshot; used by on-demand dumps
    HeapSnapshot,
}

impl DumpFormat {
    pub fn suffix(&self) -> &'static str {
        match self {
            DumpFormat::RawHeap => RAW_HEAP_SUFFIX,
            DumpFormat::HeapSnapshot => HEAP_SNAPSHOT_SUFFIX,
        }
    }
}

/// How artifact paths are reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Absolute,
    FileName,
}
