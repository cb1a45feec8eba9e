// Artifact file suffixes
pub const MANIFEST_SUFFIX: &str = "jsleaklist";
pub const RAW_HEAP_SUFFIX: &str = "rawheap";
pub const HEAP_SNAPSHOT_SUFFIX: &str = "heapsnapshot";
pub const ARTIFACT_SUFFIXES: [&str; 3] = [HEAP_SNAPSHOT_SUFFIX, MANIFEST_SUFFIX, RAW_HEAP_SUFFIX];

/// Manifest schema version, written for the raw-heap format only
pub const MANIFEST_VERSION: &str = "2.0.0";

/// Read buffer used while hashing a snapshot file
pub const CHECKSUM_BUFFER_SIZE: usize = 40960;

pub const DEFAULT_DUMP_DIR_NAME: &str = "jsleak";

// Structured-config defaults
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 30000;
pub const DEFAULT_DUMP_HEAP_WAIT_TIME_MS: u64 = 5000;
pub const DEFAULT_RETAINED_VISIBLE_THRESHOLD: u32 = 5;
pub const DEFAULT_RETAINED_INVISIBLE_THRESHOLD: u32 = 1;
pub const DEFAULT_MAX_STORED_HEAP_DUMPS: u32 = 10;

// Tick timings used in simple mode
pub const DEFAULT_GC_INTERVAL_MS: u64 = 27000;
pub const DEFAULT_DUMP_DELAY_MS: u64 = 30000;

// API error codes
pub const ERROR_CODE_INVALID_PARAM: i32 = 401;
pub const ERROR_CODE_ENABLE_INVALID: i32 = 10801001;
pub const ERROR_CODE_CONFIG_INVALID: i32 = 10801002;
pub const ERROR_CODE_CALLBACK_INVALID: i32 = 10801003;
