use std::fmt;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::RwLock;
use tracing::trace;

use crate::WatchTarget;
use crate::Watchable;

/// A host object was torn down
#[derive(Clone)]
pub struct LifecycleEvent {
    pub object: Weak<dyn Watchable>,
    pub message: String,
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("alive", &(self.object.strong_count() > 0))
            .field("message", &self.message)
            .finish()
    }
}

impl LifecycleEvent {
    pub fn new(
        object: &Arc<dyn Watchable>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            object: Arc::downgrade(object),
            message: message.into(),
        }
    }
}

pub type LifecycleSink = Arc<dyn Fn(LifecycleEvent) + Send + Sync>;

/// Host subsystem that reports teardown of one or more watch target kinds.
///
/// At most one sink is subscribed at a time; subscribing again replaces it.
pub trait LifecycleSource: Send + Sync {
    fn targets(&self) -> &[WatchTarget];

    fn subscribe(
        &self,
        sink: LifecycleSink,
    );

    fn unsubscribe(&self);
}

/// In-process [`LifecycleSource`] the host emits teardown events into
pub struct LifecycleHub {
    targets: Vec<WatchTarget>,
    sink: RwLock<Option<LifecycleSink>>,
}

impl fmt::Debug for LifecycleHub {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LifecycleHub")
            .field("targets", &self.targets)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

impl LifecycleHub {
    pub fn new(target: WatchTarget) -> Self {
        Self::covering([target])
    }

    /// Hub for subsystems sharing one teardown notification, e.g. node containers and
    /// XComponents
    pub fn covering(targets: impl IntoIterator<Item = WatchTarget>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            sink: RwLock::new(None),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Delivers a teardown event; returns whether a subscriber received it
    pub fn emit(
        &self,
        object: &Arc<dyn Watchable>,
        message: &str,
    ) -> bool {
        // The sink runs without the lock held so it may unsubscribe
        let sink = self.sink.read().clone();
        match sink {
            Some(sink) => {
                sink(LifecycleEvent::new(object, message));
                true
            }
            None => {
                trace!(targets = ?self.targets, "no subscriber, event dropped");
                false
            }
        }
    }
}

impl LifecycleSource for LifecycleHub {
    fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }

    fn subscribe(
        &self,
        sink: LifecycleSink,
    ) {
        *self.sink.write() = Some(sink);
    }

    fn unsubscribe(&self) {
        *self.sink.write() = None;
    }
}
