use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::warn;

use crate::constants::CHECKSUM_BUFFER_SIZE;
use crate::Result;
use crate::StorageError;

/// Creates `path` (and its parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| StorageError::PathError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(?path, "created directory");
    Ok(())
}

/// Prepares the file a native dumper writes into.
///
/// An existing file must be writable. A new file is created owner read/write, group read.
pub fn create_target_file(path: &Path) -> Result<()> {
    if path.exists() {
        let metadata = fs::metadata(path).map_err(|e| StorageError::PathError {
            path: path.to_path_buf(),
            source: e,
        })?;
        if metadata.permissions().readonly() {
            return Err(StorageError::PathError {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "dump target is read-only",
                ),
            }
            .into());
        }
        return Ok(());
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }
    options.open(path).map_err(|e| StorageError::PathError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Streams `path` through SHA-256 and returns the digest as uppercase hex
pub fn sha256_hex_upper(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| StorageError::PathError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHECKSUM_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buf).map_err(StorageError::IoError)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(to_hex_upper(&hasher.finalize()))
}

pub(crate) fn to_hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Moves a file, falling back to copy + delete when `rename` crosses filesystems
pub fn move_file(
    from: &Path,
    to: &Path,
) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(?from, ?to, %e, "rename failed, falling back to copy");
            fs::copy(from, to).map_err(|e| StorageError::PathError {
                path: to.to_path_buf(),
                source: e,
            })?;
            delete_file(from)
        }
    }
}

pub fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| {
        StorageError::PathError {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}
