use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::Scheduler;
use super::Tick;
use super::TickHandler;
use super::TickIntervals;
use super::TickTimer;
use crate::Error;
use crate::Result;

struct ArmedTask {
    cancel: CancellationToken,
    shutdown: Arc<Notify>,
}

/// Scheduler running one tokio task per arming.
///
/// `arm` must be called from within a tokio runtime.
#[derive(Default)]
pub struct TokioScheduler {
    armed: Mutex<Option<ArmedTask>>,
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a [`Tick::Shutdown`] after the tick in progress, if any
    pub fn trigger_shutdown(&self) {
        if let Some(task) = self.armed.lock().as_ref() {
            task.shutdown.notify_one();
        }
    }
}

impl Scheduler for TokioScheduler {
    fn arm(
        &self,
        intervals: TickIntervals,
        handler: Weak<dyn TickHandler>,
    ) -> Result<()> {
        let runtime = Handle::try_current().map_err(|e| Error::Scheduler(e.to_string()))?;

        let cancel = CancellationToken::new();
        let shutdown = Arc::new(Notify::new());
        let previous = self.armed.lock().replace(ArmedTask {
            cancel: cancel.clone(),
            shutdown: shutdown.clone(),
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        runtime.spawn(run_ticks(intervals, handler, cancel, shutdown));
        debug!(?intervals, "tick scheduler armed");
        Ok(())
    }

    fn disarm(&self) {
        if let Some(task) = self.armed.lock().take() {
            task.cancel.cancel();
            debug!("tick scheduler disarmed");
        }
    }

    fn is_armed(&self) -> bool {
        self.armed
            .lock()
            .as_ref()
            .is_some_and(|task| !task.cancel.is_cancelled())
    }
}

async fn run_ticks(
    intervals: TickIntervals,
    handler: Weak<dyn TickHandler>,
    cancel: CancellationToken,
    shutdown: Arc<Notify>,
) {
    let mut timer = TickTimer::new(intervals);
    loop {
        let next_dump = timer.next_dump_deadline();
        let tick = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = shutdown.notified() => Tick::Shutdown,
            _ = sleep_until(next_dump.unwrap_or_else(|| timer.gc_deadline())), if next_dump.is_some() => {
                timer.pop_dump();
                Tick::Dump
            }
            _ = sleep_until(timer.gc_deadline()) => Tick::Collect,
        };

        let Some(handler) = handler.upgrade() else {
            trace!("tick handler dropped, scheduler exiting");
            break;
        };
        trace!(?tick, "delivering tick");
        handler.on_tick(tick).await;

        match tick {
            Tick::Collect => timer.collect_done(),
            Tick::Shutdown => break,
            Tick::Dump => {}
        }
        if cancel.is_cancelled() {
            break;
        }
    }
}
