use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::DumpCallback;
use crate::Watchable;

/// Watchable with an explicit type name and native id
#[derive(Debug)]
pub struct TestObject {
    pub type_name: String,
    pub id: Option<u64>,
}

impl Watchable for TestObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn native_id(&self) -> Option<u64> {
        self.id
    }
}

pub fn watched(
    type_name: &str,
    id: Option<u64>,
) -> Arc<dyn Watchable> {
    Arc::new(TestObject {
        type_name: type_name.to_string(),
        id,
    })
}

/// Every invocation of a dump callback, in order
pub type CallbackLog = Arc<Mutex<Vec<Vec<PathBuf>>>>;

pub fn recording_callback() -> (DumpCallback, CallbackLog) {
    let log: CallbackLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    (Arc::new(move |paths| sink.lock().push(paths)), log)
}
