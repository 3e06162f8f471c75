//! Error types for Jamlist core operations.
//!
//! Errors are grouped by domain (playlists, paths, file system, media). The
//! top-level [`Error`] wraps them and classifies each one through
//! [`Error::kind`], which the scanner and the migration engine use to decide
//! whether a failure is recovered locally or aborts the command.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Jamlist core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Jam root is unset, missing, or a path lies outside of it.
    #[error("Invalid Jam root: {reason}")]
    InvalidRoot {
        /// Offending root (None when no root could be resolved at all).
        path: Option<PathBuf>,
        /// Why the root was rejected.
        reason: String,
    },

    /// Playlist related error.
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Path translation error.
    #[error(transparent)]
    Path(#[from] PathError),

    /// File system operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Audio file could not be read or rewritten.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// A track referenced by a playlist could not be located, even after
    /// searching the whole Music tree.
    #[error("Track not found: {name} (searched {})", .search_root.display())]
    TrackNotFound {
        /// File name that was searched for.
        name: String,
        /// Directory that was searched.
        search_root: PathBuf,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Playlist errors.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Playlist file does not exist.
    #[error("Playlist not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Playlist file contains a malformed directive.
    #[error("Failed to parse playlist {} at line {line}: {reason}", .path.display())]
    Parse {
        /// Playlist file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// Playlist name cannot be used as a file name.
    #[error("Invalid playlist name '{name}': {reason}")]
    InvalidName {
        /// Rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Path translation errors.
#[derive(Debug, Error)]
pub enum PathError {
    /// Path does not have the expected shape (segment depth, file name).
    #[error("Malformed path {}: {reason}", .path.display())]
    Malformed {
        /// Offending path.
        path: PathBuf,
        /// What was expected.
        reason: String,
    },

    /// Path cannot be represented as UTF-8, which device paths require.
    #[error("Path is not valid unicode: {}", .path.display())]
    NotUnicode {
        /// Offending path.
        path: PathBuf,
    },
}

/// File system errors.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Path does not exist.
    #[error("Path not found: {}", .path.display())]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Reading failed.
    #[error("Failed to read {}: {reason}", .path.display())]
    ReadFailed {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Writing failed.
    #[error("Failed to write {}: {reason}", .path.display())]
    WriteFailed {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Directory creation failed.
    #[error("Failed to create directory {}: {reason}", .path.display())]
    CreateDirFailed {
        /// Directory being created.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Copy failed.
    #[error("Failed to copy {} to {}: {reason}", .source_path.display(), .destination.display())]
    CopyFailed {
        /// Source file.
        source_path: PathBuf,
        /// Destination file.
        destination: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Move failed.
    #[error("Failed to move {} to {}: {reason}", .source_path.display(), .destination.display())]
    MoveFailed {
        /// Source file.
        source_path: PathBuf,
        /// Destination file.
        destination: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Deletion failed.
    #[error("Failed to delete {}: {reason}", .path.display())]
    DeleteFailed {
        /// Path being deleted.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },
}

/// Errors reading or rewriting audio files.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file has no readable audio container.
    #[error("Invalid media file {}: {reason}", .path.display())]
    InvalidMedia {
        /// Audio file.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },

    /// Embedded artwork could not be rewritten.
    #[error("Artwork update failed for {}: {reason}", .path.display())]
    Artwork {
        /// Audio file.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },
}

/// Error category, used to pick the recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Jam root unusable. Fatal before any command runs.
    InvalidRoot,
    /// Playlist file missing.
    PlaylistNotFound,
    /// Playlist file malformed.
    PlaylistParse,
    /// Playlist name rejected.
    InvalidName,
    /// Hashed or device path has the wrong shape.
    MalformedPath,
    /// Track missing after fallback search.
    FileNotFound,
    /// Unreadable audio file. Recovered per file.
    InvalidMedia,
    /// Other file system failure.
    FileSystem,
    /// Bad configuration.
    Configuration,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRoot { .. } => ErrorKind::InvalidRoot,
            Self::Playlist(PlaylistError::NotFound { .. }) => ErrorKind::PlaylistNotFound,
            Self::Playlist(PlaylistError::Parse { .. }) => ErrorKind::PlaylistParse,
            Self::Playlist(PlaylistError::InvalidName { .. }) => ErrorKind::InvalidName,
            Self::Path(_) => ErrorKind::MalformedPath,
            Self::TrackNotFound { .. } => ErrorKind::FileNotFound,
            Self::Media(_) => ErrorKind::InvalidMedia,
            Self::FileSystem(_) => ErrorKind::FileSystem,
            Self::Configuration(_) | Self::Serialization(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the failure only affects a single file and the batch may go on.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidMedia)
    }

    /// Build an [`Error::InvalidRoot`].
    pub fn invalid_root(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path,
            reason: reason.into(),
        }
    }

    /// Build a [`PathError::Malformed`].
    pub fn malformed_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Path(PathError::Malformed {
            path: path.into(),
            reason: reason.into(),
        })
    }
}
