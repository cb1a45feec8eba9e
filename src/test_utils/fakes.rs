use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::Error;
use crate::HeapSnapshotter;
use crate::ProcessInfo;
use crate::ProcessState;
use crate::ProcessStateSource;
use crate::Result;

/// Snapshotter that writes a fixed payload, staging text snapshots in `staging_dir`
#[derive(Debug)]
pub struct FileSnapshotter {
    pub staging_dir: PathBuf,
    pub payload: Vec<u8>,
    calls: AtomicUsize,
}

impl FileSnapshotter {
    pub fn new(staging_dir: &Path) -> Self {
        Self {
            staging_dir: staging_dir.to_path_buf(),
            payload: b"heap-bytes".to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn write(
        &self,
        path: &Path,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::write(path, &self.payload).map_err(|e| crate::StorageError::IoError(e).into())
    }
}

#[async_trait]
impl HeapSnapshotter for FileSnapshotter {
    fn dump_raw_heap_sync(
        &self,
        path: &Path,
    ) -> Result<()> {
        self.write(path)
    }

    async fn dump_raw_heap(
        &self,
        path: PathBuf,
    ) -> Result<()> {
        self.write(&path)
    }

    fn dump_heap_snapshot(
        &self,
        file_name: &str,
    ) -> Result<PathBuf> {
        let path = self.staging_dir.join(file_name);
        self.write(&path)?;
        Ok(path)
    }
}

/// Process list whose contents tests can change between ticks
#[derive(Debug, Default)]
pub struct StaticProcesses {
    processes: Mutex<Option<Vec<ProcessInfo>>>,
}

impl StaticProcesses {
    pub fn with(
        process_name: &str,
        state: ProcessState,
    ) -> Self {
        let source = Self::default();
        source.set(process_name, state);
        source
    }

    pub fn set(
        &self,
        process_name: &str,
        state: ProcessState,
    ) {
        *self.processes.lock() = Some(vec![ProcessInfo {
            process_name: process_name.to_string(),
            state,
        }]);
    }

    /// Makes every subsequent query fail
    pub fn fail(&self) {
        *self.processes.lock() = None;
    }
}

#[async_trait]
impl ProcessStateSource for StaticProcesses {
    async fn running_processes(&self) -> Result<Vec<ProcessInfo>> {
        self.processes
            .lock()
            .clone()
            .ok_or_else(|| Error::Process("process list unavailable".to_string()))
    }
}
