use std::path::PathBuf;
use std::sync::Arc;

use tempfile::tempdir;
use tempfile::TempDir;

use super::recording_callback;
use super::CallbackLog;
use super::FileSnapshotter;
use super::StaticProcesses;
use crate::LeakWatchSettings;
use crate::LeakWatcher;
use crate::LeakWatcherBuilder;
use crate::LifecycleHub;
use crate::ManualScheduler;
use crate::ProcessState;
use crate::Tick;
use crate::WatchOptions;
use crate::WatchTarget;
use crate::WeakRefTracker;

pub const TEST_PROCESS_NAME: &str = "com.example.app";

/// A watcher wired to in-process collaborators the test can drive and inspect
pub struct WatcherHarness {
    pub watcher: LeakWatcher,
    pub scheduler: Arc<ManualScheduler>,
    pub tracker: Arc<WeakRefTracker>,
    pub processes: Arc<StaticProcesses>,
    pub snapshotter: Arc<FileSnapshotter>,
    pub windows: Arc<LifecycleHub>,
    pub components: Arc<LifecycleHub>,
    pub dir: TempDir,
}

impl WatcherHarness {
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    pub fn with_settings(customize: impl FnOnce(&mut LeakWatchSettings)) -> Self {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        std::fs::create_dir_all(&staging).unwrap();

        let mut settings = LeakWatchSettings::default();
        settings.app.process_name = TEST_PROCESS_NAME.to_string();
        settings.storage.files_dir = dir.path().join("files");
        customize(&mut settings);

        let scheduler = Arc::new(ManualScheduler::new());
        let tracker = Arc::new(WeakRefTracker::new());
        let processes = Arc::new(StaticProcesses::with(
            TEST_PROCESS_NAME,
            ProcessState::Foreground,
        ));
        let snapshotter = Arc::new(FileSnapshotter::new(&staging));
        let windows = Arc::new(LifecycleHub::new(WatchTarget::Window));
        let components = Arc::new(LifecycleHub::new(WatchTarget::CustomComponent));

        let watcher = LeakWatcherBuilder::new(settings, processes.clone(), snapshotter.clone())
            .weak_ref_tracker(tracker.clone())
            .scheduler(scheduler.clone())
            .lifecycle_source(windows.clone())
            .lifecycle_source(components.clone())
            .build();

        Self {
            watcher,
            scheduler,
            tracker,
            processes,
            snapshotter,
            windows,
            components,
            dir,
        }
    }

    /// Enables the full watcher, returning the log of dump callbacks
    pub fn enable(
        &self,
        options: WatchOptions,
    ) -> CallbackLog {
        let (callback, log) = recording_callback();
        self.watcher
            .enable_leak_watcher(Some(true), Some(options), Some(callback))
            .unwrap();
        log
    }

    pub fn disable(&self) {
        self.watcher
            .enable_leak_watcher(
                Some(false),
                Some(WatchOptions::Targets(Vec::new())),
                Some(Arc::new(|_| {})),
            )
            .unwrap();
    }

    pub async fn fire(
        &self,
        tick: Tick,
    ) -> bool {
        self.scheduler.fire(tick).await
    }

    /// Sorted file names currently in the dump directory
    pub fn dump_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.watcher.dump_dir())
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.dir.path().join("staging")
    }
}
