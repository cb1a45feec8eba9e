//! The leak watcher instance hosts talk to.
//!
//! [`LeakWatcher`] owns the registry, the active session and the tick handling; the collaborators
//! it needs from the host are wired in through [`LeakWatcherBuilder`].
mod builder;
mod leak_watcher;
mod session;
pub use builder::*;
pub use leak_watcher::*;
pub use session::*;
