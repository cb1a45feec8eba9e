//! Watched-object bookkeeping.
//!
//! Objects are identified by a stable hash, held only through weak references, and removed
//! from the registry as soon as the runtime reclaims them.
mod identity;
mod watch_filter;
mod watch_registry;
mod weak_tracker;
pub use identity::*;
pub use watch_filter::*;
pub use watch_registry::*;
pub use weak_tracker::*;
