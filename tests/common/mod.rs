#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use leak_watch::DumpCallback;
use leak_watch::Error;
use leak_watch::HeapSnapshotter;
use leak_watch::LeakWatchSettings;
use leak_watch::ProcessInfo;
use leak_watch::ProcessState;
use leak_watch::ProcessStateSource;
use leak_watch::Result;
use leak_watch::StorageError;
use leak_watch::Watchable;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const PROCESS_NAME: &str = "com.example.shop";

/// A UI component as a host would hand it over
#[derive(Debug)]
pub struct Component {
    pub id: u64,
}

impl Watchable for Component {
    fn native_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug)]
pub struct Window;

impl Watchable for Window {}

pub fn component(id: u64) -> Arc<dyn Watchable> {
    Arc::new(Component { id })
}

pub fn window() -> Arc<dyn Watchable> {
    Arc::new(Window)
}

/// Heap dumper writing a recognizable payload; text snapshots are written straight into
/// `staging`
#[derive(Debug)]
pub struct PayloadDumper {
    pub staging: PathBuf,
}

#[async_trait]
impl HeapSnapshotter for PayloadDumper {
    fn dump_raw_heap_sync(
        &self,
        path: &Path,
    ) -> Result<()> {
        std::fs::write(path, b"RAWHEAP").map_err(|e| StorageError::IoError(e).into())
    }

    async fn dump_raw_heap(
        &self,
        path: PathBuf,
    ) -> Result<()> {
        self.dump_raw_heap_sync(&path)
    }

    fn dump_heap_snapshot(
        &self,
        file_name: &str,
    ) -> Result<PathBuf> {
        let path = self.staging.join(file_name);
        std::fs::write(&path, b"{\"snapshot\":{}}").map_err(StorageError::IoError)?;
        Ok(path)
    }
}

/// Running-process list the test flips between states
#[derive(Debug)]
pub struct ProcessTable {
    state: Mutex<Option<ProcessState>>,
}

impl ProcessTable {
    pub fn new(state: ProcessState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub fn set(
        &self,
        state: Option<ProcessState>,
    ) {
        *self.state.lock() = state;
    }
}

#[async_trait]
impl ProcessStateSource for ProcessTable {
    async fn running_processes(&self) -> Result<Vec<ProcessInfo>> {
        match *self.state.lock() {
            Some(state) => Ok(vec![ProcessInfo {
                process_name: PROCESS_NAME.to_string(),
                state,
            }]),
            None => Err(Error::Process("process manager unavailable".to_string())),
        }
    }
}

pub fn settings(dir: &TempDir) -> LeakWatchSettings {
    let mut settings = LeakWatchSettings::default();
    settings.app.process_name = PROCESS_NAME.to_string();
    settings.storage.files_dir = dir.path().join("files");
    settings
}

/// Dump callback forwarding every report to a channel
pub fn channel_callback() -> (DumpCallback, mpsc::UnboundedReceiver<Vec<PathBuf>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: DumpCallback = Arc::new(move |paths| {
        let _ = tx.send(paths);
    });
    (callback, rx)
}
