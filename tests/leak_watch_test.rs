mod common;

use std::sync::Arc;
use std::time::Duration;

use leak_watch::LeakManifest;
use leak_watch::LeakWatcher;
use leak_watch::LeakWatcherBuilder;
use leak_watch::LeakWatcherConfig;
use leak_watch::LifecycleHub;
use leak_watch::ManualScheduler;
use leak_watch::ProcessState;
use leak_watch::Tick;
use leak_watch::TokioScheduler;
use leak_watch::WatchOptions;
use leak_watch::WatchTarget;
use leak_watch::WatcherState;
use leak_watch::WeakRefTracker;
use tempfile::tempdir;
use tempfile::TempDir;
use tracing_test::traced_test;

use crate::common::channel_callback;
use crate::common::component;
use crate::common::settings;
use crate::common::window;
use crate::common::PayloadDumper;
use crate::common::ProcessTable;

struct Host {
    watcher: LeakWatcher,
    scheduler: Arc<ManualScheduler>,
    processes: Arc<ProcessTable>,
    components: Arc<LifecycleHub>,
    windows: Arc<LifecycleHub>,
    dir: TempDir,
}

fn manual_host() -> Host {
    let dir = tempdir().unwrap();
    let staging = dir.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    let scheduler = Arc::new(ManualScheduler::new());
    let processes = Arc::new(ProcessTable::new(ProcessState::Foreground));
    let components = Arc::new(LifecycleHub::new(WatchTarget::CustomComponent));
    let windows = Arc::new(LifecycleHub::new(WatchTarget::Window));

    let watcher = LeakWatcherBuilder::new(
        settings(&dir),
        processes.clone(),
        Arc::new(PayloadDumper { staging }),
    )
    .weak_ref_tracker(Arc::new(WeakRefTracker::new()))
    .scheduler(scheduler.clone())
    .lifecycle_source(components.clone())
    .lifecycle_source(windows.clone())
    .build();

    Host {
        watcher,
        scheduler,
        processes,
        components,
        windows,
        dir,
    }
}

#[tokio::test]
#[traced_test]
async fn test_structured_session_reports_leaked_components() {
    let host = manual_host();
    let (callback, mut reports) = channel_callback();
    let config: LeakWatcherConfig = serde_json::from_str(
        r#"{
            "objectWatcher": "CustomComponent",
            "checkInterval": 10000,
            "dumpHeapWaitTimeMs": 2000,
            "retainedVisibleThreshold": 2,
            "retainedInvisibleThreshold": 1,
            "maxStoredHeapDumps": 2
        }"#,
    )
    .unwrap();
    host.watcher
        .enable_leak_watcher(
            Some(true),
            Some(WatchOptions::Config(config)),
            Some(callback),
        )
        .unwrap();
    assert_eq!(host.watcher.state(), WatcherState::Enabled);
    assert!(host.components.is_subscribed());
    assert!(!host.windows.is_subscribed());

    let leaked = component(1);
    let released = component(2);
    host.components.emit(&leaked, "CardView aboutToDisappear");
    host.components.emit(&released, "ListItem aboutToDisappear");
    drop(released);

    // Foreground with two watched objects meets the visible threshold
    host.scheduler.fire(Tick::Collect).await;
    assert_eq!(host.watcher.registry().len(), 1);

    // One survivor is below the visible threshold of two
    host.scheduler.fire(Tick::Dump).await;
    assert!(reports.try_recv().is_err());

    // In the background a single survivor is enough
    host.processes.set(Some(ProcessState::Background));
    host.scheduler.fire(Tick::Collect).await;
    host.scheduler.fire(Tick::Dump).await;

    let paths = reports.try_recv().unwrap();
    assert_eq!(paths.len(), 2);
    let manifest = LeakManifest::read_from(&paths[0]).unwrap();
    assert_eq!(manifest.leak_obj_list.len(), 1);
    assert_eq!(manifest.leak_obj_list[0].name, "Component");
    assert_eq!(manifest.leak_obj_list[0].msg, "CardView aboutToDisappear");
    assert_eq!(std::fs::read(&paths[1]).unwrap(), b"RAWHEAP");

    host.watcher
        .enable_leak_watcher(
            Some(false),
            Some(WatchOptions::Targets(vec![])),
            Some(Arc::new(|_| {})),
        )
        .unwrap();
    assert!(!host.components.is_subscribed());
    assert!(!host.components.emit(&leaked, "late"));
}

#[tokio::test]
async fn test_quick_check_and_on_demand_dump() {
    let host = manual_host();
    let out = host.dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    host.watcher.enable_quick_check(Some(true)).unwrap();
    let main_window = window();
    host.watcher
        .watch(Some(&main_window), Some("settings window closed"))
        .unwrap();

    let listed: serde_json::Value = serde_json::from_str(&host.watcher.check()).unwrap();
    assert_eq!(listed[0]["name"], "Window");
    assert!(listed[0]["hash"].is_u64());

    let files = host.watcher.dump(Some(&out)).unwrap();
    assert_eq!(files.len(), 2);
    assert!(out.join(&files[1]).is_file());
    let manifest = LeakManifest::read_from(&out.join(&files[0])).unwrap();
    assert!(manifest.version.is_none());
    assert_eq!(manifest.leak_obj_list[0].msg, "settings window closed");

    host.watcher.enable_quick_check(Some(false)).unwrap();
    assert_eq!(host.watcher.check(), "");
    assert!(host.watcher.dump(Some(&out)).unwrap().is_empty());
}

#[tokio::test]
async fn test_retention_bounds_dump_directory() {
    let host = manual_host();
    host.processes.set(Some(ProcessState::Active));
    let (callback, mut reports) = channel_callback();
    host.watcher
        .enable_leak_watcher(
            Some(true),
            Some(WatchOptions::Config(LeakWatcherConfig {
                max_stored_heap_dumps: 2,
                ..Default::default()
            })),
            Some(callback),
        )
        .unwrap();

    for _ in 0..5 {
        host.scheduler.fire(Tick::Collect).await;
        host.scheduler.fire(Tick::Dump).await;
    }

    let mut reported = 0;
    while reports.try_recv().is_ok() {
        reported += 1;
    }
    assert_eq!(reported, 5);
    assert_eq!(std::fs::read_dir(host.watcher.dump_dir()).unwrap().count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_tokio_scheduler_drives_simple_mode() {
    let dir = tempdir().unwrap();
    let staging = dir.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    let mut settings = settings(&dir);
    settings.schedule.gc_interval_ms = 1000;
    settings.schedule.dump_delay_ms = 500;
    let scheduler = Arc::new(TokioScheduler::new());
    let windows = Arc::new(LifecycleHub::new(WatchTarget::Window));

    let watcher = LeakWatcherBuilder::new(
        settings,
        Arc::new(ProcessTable::new(ProcessState::Foreground)),
        Arc::new(PayloadDumper { staging }),
    )
    .scheduler(scheduler.clone())
    .lifecycle_source(windows.clone())
    .build();

    let (callback, mut reports) = channel_callback();
    watcher
        .enable_leak_watcher(
            Some(true),
            Some(WatchOptions::Targets(vec!["Window".to_string()])),
            Some(callback),
        )
        .unwrap();
    let popup = window();
    windows.emit(&popup, "popup destroyed");

    let paths = tokio::time::timeout(Duration::from_secs(5), reports.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(paths[0].is_absolute());
    assert_eq!(paths[1].extension().unwrap(), "rawheap");

    scheduler.trigger_shutdown();
    tokio::time::timeout(Duration::from_secs(5), async {
        while watcher.state() != WatcherState::Disabled {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert!(watcher.registry().is_empty());
    assert!(!windows.is_subscribed());
}
