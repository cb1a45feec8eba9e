use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::AppSnapshot;
use super::DumpCallback;
use super::Session;
use super::WatcherState;
use crate::file_io::ensure_dir;
use crate::resolve_app_state;
use crate::survivors;
use crate::ActiveConfig;
use crate::AppState;
use crate::DumpArtifacts;
use crate::DumpCoordinator;
use crate::DumpFormat;
use crate::DumpRequest;
use crate::Error;
use crate::GarbageCollector;
use crate::LeakWatchSettings;
use crate::LifecycleEvent;
use crate::LifecycleSink;
use crate::LifecycleSource;
use crate::PathStyle;
use crate::PolicyContext;
use crate::ProcessStateSource;
use crate::Result;
use crate::Scheduler;
use crate::Tick;
use crate::TickHandler;
use crate::TickPhase;
use crate::WatchOptions;
use crate::WatchRegistry;
use crate::WatchTarget;
use crate::Watchable;
use crate::WatchedObject;

/// Retention limit for on-demand dumps taken while no session is active
const IDLE_MAX_STORED_FILES: usize = crate::constants::DEFAULT_MAX_STORED_HEAP_DUMPS as usize * 2;

/// Handle to the process-wide leak watcher; clones share one instance
#[derive(Clone)]
pub struct LeakWatcher {
    pub(super) inner: Arc<WatcherInner>,
}

impl std::fmt::Debug for LeakWatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LeakWatcher")
            .field("state", &self.state())
            .field("quick_check", &self.is_quick_check_enabled())
            .field("watched", &self.inner.registry.len())
            .finish()
    }
}

pub(crate) struct WatcherInner {
    me: Weak<WatcherInner>,
    settings: LeakWatchSettings,
    registry: Arc<WatchRegistry>,
    collector: Arc<dyn GarbageCollector>,
    processes: Arc<dyn ProcessStateSource>,
    coordinator: DumpCoordinator,
    scheduler: Arc<dyn Scheduler>,
    lifecycle_sources: Vec<Arc<dyn LifecycleSource>>,
    subscribed: Mutex<Vec<Arc<dyn LifecycleSource>>>,

    /// Serializes state transitions
    state: Mutex<WatcherState>,
    /// Mirrors `state == Enabled` for lock-free reads
    enabled: AtomicBool,
    quick_check: AtomicBool,
    session: ArcSwapOption<Session>,
    epoch: AtomicU64,
    snapshot: Mutex<AppSnapshot>,
}

/// Collaborators assembled by the builder
pub(crate) struct WatcherParts {
    pub(crate) settings: LeakWatchSettings,
    pub(crate) registry: Arc<WatchRegistry>,
    pub(crate) collector: Arc<dyn GarbageCollector>,
    pub(crate) processes: Arc<dyn ProcessStateSource>,
    pub(crate) coordinator: DumpCoordinator,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) lifecycle_sources: Vec<Arc<dyn LifecycleSource>>,
}

impl LeakWatcher {
    pub(crate) fn from_parts(parts: WatcherParts) -> Self {
        let inner = Arc::new_cyclic(|me| WatcherInner {
            me: me.clone(),
            settings: parts.settings,
            registry: parts.registry,
            collector: parts.collector,
            processes: parts.processes,
            coordinator: parts.coordinator,
            scheduler: parts.scheduler,
            lifecycle_sources: parts.lifecycle_sources,
            subscribed: Mutex::new(Vec::new()),
            state: Mutex::new(WatcherState::Disabled),
            enabled: AtomicBool::new(false),
            quick_check: AtomicBool::new(false),
            session: ArcSwapOption::empty(),
            epoch: AtomicU64::new(0),
            snapshot: Mutex::new(AppSnapshot::default()),
        });
        Self { inner }
    }

    /// Registers `object` with the registry, bypassing any configured filter.
    ///
    /// Arguments are validated before anything else; a disabled watcher ignores the call.
    pub fn watch(
        &self,
        object: Option<&Arc<dyn Watchable>>,
        message: Option<&str>,
    ) -> Result<()> {
        let object = object.ok_or(Error::InvalidParameter("obj"))?;
        let message = message.ok_or(Error::InvalidParameter("msg"))?;
        if !self.inner.is_active() {
            debug!("watcher disabled, watch ignored");
            return Ok(());
        }
        self.inner.registry.register(Some(object), message);
        Ok(())
    }

    /// Current watch list as a JSON array, or an empty string while disabled
    pub fn check(&self) -> String {
        if !self.inner.is_active() {
            return String::new();
        }
        match self.inner.registry.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(?e, "failed to serialize watch list");
                String::new()
            }
        }
    }

    /// Takes a text heap snapshot and leak list into `dir`, returning their file names.
    ///
    /// A disabled watcher returns an empty list; a missing directory is an invalid parameter.
    #[instrument(skip(self))]
    pub fn dump(
        &self,
        dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.ok_or(Error::InvalidParameter("path"))?;
        if !self.inner.is_active() {
            return Ok(Vec::new());
        }
        let request = DumpRequest {
            dir: dir.to_path_buf(),
            format: DumpFormat::HeapSnapshot,
            style: PathStyle::FileName,
            max_stored_files: self.inner.max_stored_files(),
        };
        Ok(self
            .inner
            .coordinator
            .dump_sync(&request)?
            .map(DumpArtifacts::into_vec)
            .unwrap_or_default())
    }

    /// Toggles the watch/check/dump surface independently of the threshold engine
    pub fn enable_quick_check(
        &self,
        is_enabled: Option<bool>,
    ) -> Result<()> {
        let is_enabled = is_enabled.ok_or(Error::InvalidParameter("isEnabled"))?;
        self.inner.quick_check.store(is_enabled, Ordering::SeqCst);
        if !is_enabled && !self.inner.enabled.load(Ordering::SeqCst) {
            self.inner.registry.clear();
        }
        info!(is_enabled, "quick check toggled");
        Ok(())
    }

    /// Starts or stops the threshold-driven watcher.
    ///
    /// All three arguments are required, even to stop. Enabling an enabled watcher is a no-op;
    /// stopping always turns quick check off and empties the registry.
    pub fn enable_leak_watcher(
        &self,
        is_enabled: Option<bool>,
        options: Option<WatchOptions>,
        callback: Option<DumpCallback>,
    ) -> Result<()> {
        let is_enabled = is_enabled.ok_or(Error::EnableFlagInvalid)?;
        let options = options.ok_or_else(|| Error::ConfigInvalid("config is required".to_string()))?;
        let callback = callback.ok_or(Error::CallbackInvalid)?;

        if is_enabled {
            self.inner.enable(options, callback)
        } else {
            self.inner.disable();
            Ok(())
        }
    }

    /// Lifecycle state of the threshold-driven watcher
    pub fn state(&self) -> WatcherState {
        *self.inner.state.lock()
    }

    /// Whether watch/check/dump are enabled independently of the threshold engine
    pub fn is_quick_check_enabled(&self) -> bool {
        self.inner.quick_check.load(Ordering::SeqCst)
    }

    /// Objects currently watched
    pub fn registry(&self) -> &Arc<WatchRegistry> {
        &self.inner.registry
    }

    /// Directory automatic dumps are written to
    pub fn dump_dir(&self) -> PathBuf {
        self.inner.settings.storage.dump_dir()
    }

    /// Normalized configuration of the running session
    pub fn active_config(&self) -> Option<ActiveConfig> {
        self.inner.session.load().as_ref().map(|s| s.config.clone())
    }
}

impl WatcherInner {
    fn is_active(&self) -> bool {
        self.quick_check.load(Ordering::SeqCst) || self.enabled.load(Ordering::SeqCst)
    }

    fn max_stored_files(&self) -> usize {
        self.session
            .load()
            .as_ref()
            .map_or(IDLE_MAX_STORED_FILES, |s| s.config.max_stored_files)
    }

    fn enable(
        &self,
        options: WatchOptions,
        callback: DumpCallback,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if *state == WatcherState::Enabled {
            info!("leak watcher already started");
            return Ok(());
        }
        *state = WatcherState::Enabling;

        let config = match ActiveConfig::from_options(&options, &self.settings.schedule) {
            Ok(config) => config,
            Err(e) => {
                warn!(?e, "rejected leak watcher config");
                *state = WatcherState::Disabled;
                return Err(e);
            }
        };

        let dump_dir = self.settings.storage.dump_dir();
        if let Err(e) = ensure_dir(&dump_dir) {
            error!(?e, ?dump_dir, "cannot create dump directory, leak watcher stays disabled");
            *state = WatcherState::Disabled;
            return Ok(());
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let intervals = config.intervals;
        let targets = config.targets.clone();
        self.session.store(Some(Arc::new(Session {
            epoch,
            policy: config.policy(),
            config,
            callback,
            dump_dir,
        })));
        *self.snapshot.lock() = AppSnapshot::default();

        let handler: Weak<dyn TickHandler> = self.me.clone();
        if let Err(e) = self.scheduler.arm(intervals, handler) {
            error!(?e, "cannot arm tick scheduler, leak watcher stays disabled");
            self.session.store(None);
            *state = WatcherState::Disabled;
            return Ok(());
        }

        self.enabled.store(true, Ordering::SeqCst);
        self.subscribe_lifecycle(&targets);
        *state = WatcherState::Enabled;
        info!(epoch, ?targets, ?intervals, "leak watcher started");
        Ok(())
    }

    /// Stops the watcher and the quick check surface; `check` is silent afterwards
    fn disable(&self) {
        let mut state = self.state.lock();
        self.quick_check.store(false, Ordering::SeqCst);
        if *state == WatcherState::Disabled {
            self.registry.clear();
            info!("leak watcher already stopped");
            return;
        }

        self.enabled.store(false, Ordering::SeqCst);
        self.scheduler.disarm();
        for source in self.subscribed.lock().drain(..) {
            source.unsubscribe();
        }
        self.session.store(None);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.registry.clear();
        *self.snapshot.lock() = AppSnapshot::default();
        *state = WatcherState::Disabled;
        info!("leak watcher stopped");
    }

    fn subscribe_lifecycle(
        &self,
        targets: &[WatchTarget],
    ) {
        let mut subscribed = self.subscribed.lock();
        for source in &self.lifecycle_sources {
            if !source.targets().iter().any(|t| targets.contains(t)) {
                continue;
            }
            let me = self.me.clone();
            let sink: LifecycleSink = Arc::new(move |event| {
                if let Some(inner) = me.upgrade() {
                    inner.on_lifecycle_event(event);
                }
            });
            source.subscribe(sink);
            subscribed.push(source.clone());
            debug!(targets = ?source.targets(), "subscribed lifecycle source");
        }
    }

    pub(super) fn on_lifecycle_event(
        &self,
        event: LifecycleEvent,
    ) {
        let Some(session) = self.session.load_full() else {
            return;
        };
        let Some(object) = event.object.upgrade() else {
            debug!(message = %event.message, "lifecycle object already reclaimed");
            return;
        };
        if session.config.is_structured() && !session.config.filter.admits_object(object.as_ref())
        {
            debug!(type_name = object.type_name(), "lifecycle object filtered out");
            return;
        }
        self.registry.register(Some(&object), &event.message);
    }

    async fn collect_tick(&self) {
        let Some(session) = self.session.load_full() else {
            return;
        };
        let before = self.registry.current_list();

        let app_state = if session.config.is_structured() {
            match self.processes.running_processes().await {
                Ok(processes) => resolve_app_state(&processes, &self.settings.app.process_name),
                Err(e) => {
                    error!(?e, "process state query failed");
                    self.store_snapshot(&session, before, AppState::Unknown, false);
                    return;
                }
            }
        } else {
            AppState::Unknown
        };

        let ctx = PolicyContext {
            phase: TickPhase::Collect,
            watch_count: before.len(),
            app_state,
        };
        let collected = session.policy.decide(&ctx).is_act();
        if collected {
            debug!(watch_count = before.len(), ?app_state, "forcing full collection");
            self.collector.force_full_gc();
        }
        self.store_snapshot(&session, before, app_state, collected);
    }

    fn store_snapshot(
        &self,
        session: &Session,
        leak_list: Vec<WatchedObject>,
        app_state: AppState,
        collected: bool,
    ) {
        if self.epoch.load(Ordering::SeqCst) != session.epoch {
            return;
        }
        *self.snapshot.lock() = AppSnapshot {
            leak_list,
            app_state,
            collected,
        };
    }

    async fn dump_tick(&self) {
        let Some(session) = self.session.load_full() else {
            return;
        };
        let snapshot = self.snapshot.lock().clone();

        let watch_count = if session.config.is_structured() {
            if !snapshot.collected {
                debug!("no collection was forced, dump skipped");
                return;
            }
            survivors(&snapshot.leak_list, &self.registry.current_list()).len()
        } else {
            self.registry.len()
        };
        let ctx = PolicyContext {
            phase: TickPhase::Dump,
            watch_count,
            app_state: snapshot.app_state,
        };
        if !session.policy.decide(&ctx).is_act() {
            return;
        }

        let request = DumpRequest {
            dir: session.dump_dir.clone(),
            format: DumpFormat::RawHeap,
            style: PathStyle::Absolute,
            max_stored_files: session.config.max_stored_files,
        };
        match self.coordinator.dump_async(request).await {
            Ok(Some(artifacts)) => {
                if self.epoch.load(Ordering::SeqCst) != session.epoch {
                    info!("session ended during dump, result discarded");
                    return;
                }
                (session.callback)(artifacts.into_vec());
            }
            Ok(None) => {}
            Err(e) => error!(?e, "automatic dump failed"),
        }
    }
}

#[async_trait]
impl TickHandler for WatcherInner {
    async fn on_tick(
        &self,
        tick: Tick,
    ) {
        match tick {
            Tick::Collect => self.collect_tick().await,
            Tick::Dump => self.dump_tick().await,
            Tick::Shutdown => self.disable(),
        }
    }
}
