//! Tick scheduling.
//!
//! An armed scheduler delivers [`Tick::Collect`] every GC interval, a [`Tick::Dump`]
//! `dump_delay` after each collect tick, and [`Tick::Shutdown`] on request. Ticks reach the
//! handler one at a time.
mod manual;
mod tick_timer;
mod tokio_scheduler;
pub use manual::*;
pub use tick_timer::*;
pub use tokio_scheduler::*;


use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Collect,
    Dump,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervals {
    pub gc_interval: Duration,
    pub dump_delay: Duration,
}

#[async_trait]
pub trait TickHandler: Send + Sync {
    async fn on_tick(
        &self,
        tick: Tick,
    );
}

pub trait Scheduler: Send + Sync {
    /// Starts delivering ticks to `handler`, replacing any previous arming.
    ///
    /// Delivery stops on its own once the handler is dropped.
    fn arm(
        &self,
        intervals: TickIntervals,
        handler: Weak<dyn TickHandler>,
    ) -> Result<()>;

    /// Stops delivery; pending dump ticks are dropped
    fn disarm(&self);

    fn is_armed(&self) -> bool;
}
