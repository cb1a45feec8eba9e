use std::fs;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use super::DumpFormat;
use crate::constants::MANIFEST_VERSION;
use crate::Result;
use crate::StorageError;
use crate::WatchedObject;

/// Contents of a `.jsleaklist` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakManifest {
    /// Present for raw-heap dumps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Uppercase hex SHA-256 of the snapshot file
    pub snapshot_hash: String,
    #[serde(rename = "leakObjList")]
    pub leak_obj_list: Vec<WatchedObject>,
}

impl LeakManifest {
    pub fn new(
        format: DumpFormat,
        snapshot_hash: String,
        leak_obj_list: Vec<WatchedObject>,
    ) -> Self {
        let version = match format {
            DumpFormat::RawHeap => Some(MANIFEST_VERSION.to_string()),
            DumpFormat::HeapSnapshot => None,
        };
        Self {
            version,
            snapshot_hash,
            leak_obj_list,
        }
    }

    pub fn write_to(
        &self,
        path: &Path,
    ) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StorageError::PathError {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(StorageError::Manifest)?;
        writer.flush().map_err(StorageError::IoError)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| StorageError::PathError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&bytes).map_err(StorageError::Manifest)?)
    }
}
