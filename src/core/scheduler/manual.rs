use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Weak;

use parking_lot::Mutex;

use super::Scheduler;
use super::Tick;
use super::TickHandler;
use super::TickIntervals;
use crate::Result;

/// Scheduler driven by the host: nothing fires until [`ManualScheduler::fire`] is called.
///
/// Suits hosts with their own timer facility, and tests.
#[derive(Default)]
pub struct ManualScheduler {
    armed: Mutex<Option<(TickIntervals, Weak<dyn TickHandler>)>>,
    arm_count: AtomicUsize,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("intervals", &self.intervals())
            .field("arm_count", &self.arm_count())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `tick` to the armed handler; false when disarmed or the handler is gone
    pub async fn fire(
        &self,
        tick: Tick,
    ) -> bool {
        let handler = self
            .armed
            .lock()
            .as_ref()
            .and_then(|(_, handler)| handler.upgrade());
        match handler {
            Some(handler) => {
                handler.on_tick(tick).await;
                true
            }
            None => false,
        }
    }

    /// Intervals of the current arming
    pub fn intervals(&self) -> Option<TickIntervals> {
        self.armed.lock().as_ref().map(|(intervals, _)| *intervals)
    }

    /// Number of times the scheduler was armed
    pub fn arm_count(&self) -> usize {
        self.arm_count.load(Ordering::SeqCst)
    }
}

impl Scheduler for ManualScheduler {
    fn arm(
        &self,
        intervals: TickIntervals,
        handler: Weak<dyn TickHandler>,
    ) -> Result<()> {
        *self.armed.lock() = Some((intervals, handler));
        self.arm_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disarm(&self) {
        self.armed.lock().take();
    }

    fn is_armed(&self) -> bool {
        self.armed.lock().is_some()
    }
}
