//! File operations used by the migration engine.
//!
//! Copies and moves never overwrite: an existing destination is reported as
//! [`FileOutcome::AlreadyPresent`], and a source that resolves to the
//! destination itself is reported as [`FileOutcome::SameFile`] rather than an
//! error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, FileSystemError, Result};

/// Converts an I/O error for read operations.
fn read_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for write operations.
fn write_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for directory creation.
fn create_dir_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::CreateDirFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for copy operations.
fn copy_error(src: &Path, dst: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::CopyFailed {
        source_path: src.to_path_buf(),
        destination: dst.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for move operations.
fn move_error(src: &Path, dst: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::MoveFailed {
        source_path: src.to_path_buf(),
        destination: dst.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for file deletion.
fn delete_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::DeleteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// What a copy or move actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was copied.
    Copied,
    /// The file was moved.
    Moved,
    /// The destination already existed and was left untouched.
    AlreadyPresent,
    /// Source and destination are the same file.
    SameFile,
}

/// Create a directory and its parents. Existing directories are fine.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(create_dir_error(path, e)),
    }
}

/// Whether two paths resolve to the same existing file.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `src` to `dst` unless `dst` already exists.
///
/// # Errors
///
/// Returns an error if the source is missing or the copy fails.
pub fn copy_if_absent(src: &Path, dst: &Path) -> Result<FileOutcome> {
    if same_file(src, dst) {
        debug!("Same file, nothing to copy: {}", dst.display());
        return Ok(FileOutcome::SameFile);
    }
    if dst.exists() {
        debug!("Already present: {}", dst.display());
        return Ok(FileOutcome::AlreadyPresent);
    }
    if !src.is_file() {
        return Err(Error::FileSystem(FileSystemError::NotFound {
            path: src.to_path_buf(),
        }));
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    debug!("Copying {} -> {}", src.display(), dst.display());
    fs::copy(src, dst).map_err(|e| copy_error(src, dst, e))?;
    Ok(FileOutcome::Copied)
}

/// Move `src` to `dst` unless `dst` already exists.
///
/// Falls back to copy and delete when a rename is not possible (for instance
/// across file systems).
///
/// # Errors
///
/// Returns an error if the source is missing or the move fails.
pub fn move_if_absent(src: &Path, dst: &Path) -> Result<FileOutcome> {
    if same_file(src, dst) {
        debug!("Same file, nothing to move: {}", dst.display());
        return Ok(FileOutcome::SameFile);
    }
    if dst.exists() {
        debug!("Already present: {}", dst.display());
        return Ok(FileOutcome::AlreadyPresent);
    }
    if !src.is_file() {
        return Err(Error::FileSystem(FileSystemError::NotFound {
            path: src.to_path_buf(),
        }));
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    debug!("Moving {} -> {}", src.display(), dst.display());
    if let Err(rename_err) = fs::rename(src, dst) {
        debug!("Rename failed ({}), copying instead", rename_err);
        fs::copy(src, dst).map_err(|e| move_error(src, dst, e))?;
        fs::remove_file(src).map_err(|e| delete_error(src, e))?;
    }
    Ok(FileOutcome::Moved)
}

/// Find the first file named `name` below `root`, in file name order.
#[must_use]
pub fn find_file_by_name(root: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name().to_str() == Some(name))
        .map(walkdir::DirEntry::into_path)
}

/// Remove `dir` and its ancestors while they are empty, stopping at `stop`
/// (which is never removed). Returns the number of directories removed.
pub fn prune_empty_dirs(dir: &Path, stop: &Path) -> usize {
    let mut removed = 0;
    let mut current = Some(dir);

    while let Some(path) = current {
        if path == stop || !path.starts_with(stop) {
            break;
        }
        let is_empty = fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none());
        if !is_empty {
            break;
        }
        if let Err(e) = fs::remove_dir(path) {
            warn!("Failed to remove empty directory {}: {}", path.display(), e);
            break;
        }
        debug!("Removed empty directory {}", path.display());
        removed += 1;
        current = path.parent();
    }

    removed
}

/// Read a UTF-8 text file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| read_error(path, e))
}

/// Write a text file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| write_error(path, e))
}
