use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_DUMP_DIR_NAME;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageSettings {
    /// Application files directory; the dump directory is created underneath it
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    /// Name of the dump directory under `files_dir`
    #[serde(default = "default_dump_dir_name")]
    pub dump_dir_name: String,

    /// Runtime metadata appended to every raw-heap dump, when present
    #[serde(default)]
    pub raw_heap_metadata_path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            dump_dir_name: default_dump_dir_name(),
            raw_heap_metadata_path: None,
        }
    }
}

impl StorageSettings {
    /// Root directory holding every artifact of this app
    pub fn dump_dir(&self) -> PathBuf {
        self.files_dir.join(&self.dump_dir_name)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.files_dir.as_os_str().is_empty() {
            return Err(Error::Settings(ConfigError::Message(
                "files_dir path cannot be empty".into(),
            )));
        }

        if self.dump_dir_name.is_empty()
            || self.dump_dir_name.contains(|c: char| c == '/' || c == '\\')
            || self.dump_dir_name == ".."
        {
            return Err(Error::Settings(ConfigError::Message(format!(
                "dump_dir_name `{}` must be a single path component",
                self.dump_dir_name
            ))));
        }

        if let Some(path) = &self.raw_heap_metadata_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Settings(ConfigError::Message(
                    "raw_heap_metadata_path cannot be empty when set".into(),
                )));
            }
        }

        Ok(())
    }
}

fn default_files_dir() -> PathBuf {
    std::env::temp_dir().join("leak-watch")
}
fn default_dump_dir_name() -> String {
    DEFAULT_DUMP_DIR_NAME.to_string()
}
