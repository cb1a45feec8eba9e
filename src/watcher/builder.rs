//! Assembles a [`LeakWatcher`] from settings and host collaborators.
//!
//! The process-state source and the heap snapshotter have no in-crate implementation and are
//! required. Everything else defaults to the in-crate implementation:
//! - identity: [`AddressHasher`]
//! - weak tracking and forced collection: one shared [`WeakRefTracker`]
//! - ticks: [`TokioScheduler`]
//!
//! ## Example
//! ```ignore
//! let watcher = LeakWatcherBuilder::from_env(processes, snapshotter)?
//!     .lifecycle_source(window_hub.clone())
//!     .build();
//! watcher.enable_leak_watcher(Some(true), Some(options), Some(callback))?;
//! ```

use std::sync::Arc;

use tracing::debug;

use super::LeakWatcher;
use super::WatcherParts;
use crate::AddressHasher;
use crate::DumpCoordinator;
use crate::GarbageCollector;
use crate::HeapSnapshotter;
use crate::IdentityHasher;
use crate::LeakWatchSettings;
use crate::LifecycleSource;
use crate::ProcessStateSource;
use crate::Result;
use crate::Scheduler;
use crate::TokioScheduler;
use crate::WatchRegistry;
use crate::WeakRefTracker;
use crate::WeakTracker;

pub struct LeakWatcherBuilder {
    settings: LeakWatchSettings,
    processes: Arc<dyn ProcessStateSource>,
    snapshotter: Arc<dyn HeapSnapshotter>,
    hasher: Option<Arc<dyn IdentityHasher>>,
    runtime: Option<(Arc<dyn WeakTracker>, Arc<dyn GarbageCollector>)>,
    scheduler: Option<Arc<dyn Scheduler>>,
    lifecycle_sources: Vec<Arc<dyn LifecycleSource>>,
}

impl LeakWatcherBuilder {
    pub fn new(
        settings: LeakWatchSettings,
        processes: Arc<dyn ProcessStateSource>,
        snapshotter: Arc<dyn HeapSnapshotter>,
    ) -> Self {
        Self {
            settings,
            processes,
            snapshotter,
            hasher: None,
            runtime: None,
            scheduler: None,
            lifecycle_sources: Vec::new(),
        }
    }

    /// Builder with settings loaded from `CONFIG_PATH` and `LEAK_WATCH__*` variables
    pub fn from_env(
        processes: Arc<dyn ProcessStateSource>,
        snapshotter: Arc<dyn HeapSnapshotter>,
    ) -> Result<Self> {
        let settings = LeakWatchSettings::new()?.validate()?;
        Ok(Self::new(settings, processes, snapshotter))
    }

    pub fn identity_hasher(
        mut self,
        hasher: Arc<dyn IdentityHasher>,
    ) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Host weak-reference tracking and collection
    pub fn runtime(
        mut self,
        tracker: Arc<dyn WeakTracker>,
        collector: Arc<dyn GarbageCollector>,
    ) -> Self {
        self.runtime = Some((tracker, collector));
        self
    }

    /// Shares a [`WeakRefTracker`] the caller keeps a handle to
    pub fn weak_ref_tracker(
        self,
        tracker: Arc<WeakRefTracker>,
    ) -> Self {
        self.runtime(tracker.clone(), tracker)
    }

    pub fn scheduler(
        mut self,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn lifecycle_source(
        mut self,
        source: Arc<dyn LifecycleSource>,
    ) -> Self {
        self.lifecycle_sources.push(source);
        self
    }

    pub fn build(self) -> LeakWatcher {
        let (tracker, collector) = match self.runtime {
            Some(runtime) => runtime,
            None => {
                let tracker = Arc::new(WeakRefTracker::new());
                let runtime: (Arc<dyn WeakTracker>, Arc<dyn GarbageCollector>) =
                    (tracker.clone(), tracker);
                runtime
            }
        };
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(AddressHasher) as Arc<dyn IdentityHasher>);
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()) as Arc<dyn Scheduler>);

        let registry = Arc::new(WatchRegistry::new(hasher, tracker));
        let coordinator = DumpCoordinator::new(
            self.snapshotter,
            registry.clone(),
            self.settings.storage.raw_heap_metadata_path.clone(),
        );

        debug!(settings = ?self.settings, sources = self.lifecycle_sources.len(), "building leak watcher");
        LeakWatcher::from_parts(WatcherParts {
            settings: self.settings,
            registry,
            collector,
            processes: self.processes,
            coordinator,
            scheduler,
            lifecycle_sources: self.lifecycle_sources,
        })
    }
}
