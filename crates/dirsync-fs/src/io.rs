//! Atomic writes and timestamp-preserving copies

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partially
/// written file. Acquires an advisory lock on the temp file while writing.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let filled = fill_locked(&mut temp_file, content, &temp_path, path);
    drop(temp_file);

    let result =
        filled.and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn fill_locked(file: &mut File, content: &[u8], temp_path: &Path, path: &Path) -> Result<()> {
    let lock_failed = |_| Error::LockFailed {
        path: path.to_path_buf(),
    };

    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(temp_path, e))?;
    FileExt::unlock(file).map_err(lock_failed)
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Copy `source` over `destination`, carrying the source's modification time.
///
/// Missing parent directories of `destination` are created. A source that no
/// longer exists yields [`Error::SourceVanished`]. Returns the number of bytes
/// copied.
pub fn copy_preserving_mtime(source: &Path, destination: &Path) -> Result<u64> {
    let metadata = fs::metadata(source).map_err(|e| vanished_or_io(source, e))?;
    let modified = metadata.modified().map_err(|e| Error::io(source, e))?;

    if let Some(parent) = destination.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let bytes = fs::copy(source, destination).map_err(|e| {
        if source.exists() {
            Error::io(destination, e)
        } else {
            vanished_or_io(source, e)
        }
    })?;

    let file = open_for_times(destination).map_err(|e| Error::io(destination, e))?;
    file.set_modified(modified)
        .map_err(|e| Error::io(destination, e))?;

    tracing::debug!(?source, ?destination, bytes, "Copied file");
    Ok(bytes)
}

fn vanished_or_io(path: &Path, source: std::io::Error) -> Error {
    if source.kind() == ErrorKind::NotFound {
        Error::SourceVanished {
            path: path.to_path_buf(),
        }
    } else {
        Error::io(path, source)
    }
}

// Windows needs write access to change file times; unix only needs ownership,
// which also covers read-only copies.
fn open_for_times(path: &Path) -> std::io::Result<File> {
    if cfg!(windows) {
        OpenOptions::new().write(true).open(path)
    } else {
        File::open(path)
    }
}
