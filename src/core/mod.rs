mod dump;
mod lifecycle;
mod policy;
mod process;
mod registry;
mod retention;
mod scheduler;

pub use dump::*;
pub use lifecycle::*;
pub use policy::*;
pub use process::*;
pub use registry::*;
pub use retention::*;
pub use scheduler::*;
