//! Fixtures shared by the unit tests: watchable objects, a file-writing snapshotter, a
//! configurable process list, a recording dump callback and a fully wired watcher.
mod common;
mod fakes;
mod harness;

pub use common::*;
pub use fakes::*;
pub use harness::*;
