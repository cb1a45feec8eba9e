use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::StorageError;

/// Appends the runtime metadata trailer to a finished raw heap dump.
///
/// Layout after the dump bytes: metadata file contents, dump size (u32 LE), metadata size
/// (u32 LE). Sizes above `u32::MAX` are truncated.
pub fn append_metadata(
    raw_heap: &Path,
    metadata: &Path,
) -> Result<()> {
    let raw_size = fs::metadata(raw_heap)
        .map_err(|e| StorageError::PathError {
            path: raw_heap.to_path_buf(),
            source: e,
        })?
        .len() as u32;
    let contents = fs::read(metadata).map_err(|e| StorageError::PathError {
        path: metadata.to_path_buf(),
        source: e,
    })?;
    let metadata_size = contents.len() as u32;

    let mut file = OpenOptions::new()
        .append(true)
        .open(raw_heap)
        .map_err(|e| StorageError::PathError {
            path: raw_heap.to_path_buf(),
            source: e,
        })?;
    file.write_all(&contents).map_err(StorageError::IoError)?;
    file.write_all(&raw_size.to_le_bytes())
        .map_err(StorageError::IoError)?;
    file.write_all(&metadata_size.to_le_bytes())
        .map_err(StorageError::IoError)?;

    debug!(?raw_heap, raw_size, metadata_size, "appended raw heap metadata");
    Ok(())
}
