//! Track metadata extraction.
//!
//! Reads the tag fields used for playlist titles and the hashed layout
//! (genre, artist, album, title) plus the audio duration.
//!
//! # Supported Formats
//!
//! - `ID3v1` tags
//! - ID3v2.3 and ID3v2.4 tags
//!
//! Missing or corrupt tags are not an error: the fields are left empty and the
//! placeholders below are used wherever a value is required. A file whose audio
//! stream cannot be parsed at all is reported as [`MediaError::InvalidMedia`].

use std::path::Path;

use id3::{Tag, TagLike};
use lofty::file::AudioFile;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, FileSystemError, MediaError, Result};

/// Placeholder genre for untagged tracks.
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Placeholder artist for untagged tracks.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder album for untagged tracks.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Metadata read from an audio file.
///
/// Tag fields are `None` when absent or blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// Track title.
    pub title: Option<String>,
    /// Track artist.
    pub artist: Option<String>,
    /// Album name.
    pub album: Option<String>,
    /// Genre name.
    pub genre: Option<String>,
    /// Audio duration in seconds.
    pub duration_secs: f64,
}

impl TrackMetadata {
    /// Create empty metadata with no fields set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Genre, or [`UNKNOWN_GENRE`].
    #[must_use]
    pub fn genre_or_default(&self) -> &str {
        self.genre.as_deref().unwrap_or(UNKNOWN_GENRE)
    }

    /// Artist, or [`UNKNOWN_ARTIST`].
    #[must_use]
    pub fn artist_or_default(&self) -> &str {
        self.artist.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }

    /// Album, or [`UNKNOWN_ALBUM`].
    #[must_use]
    pub fn album_or_default(&self) -> &str {
        self.album.as_deref().unwrap_or(UNKNOWN_ALBUM)
    }

    /// Playlist display title: `"<artist> - <title>"` when both tags are set,
    /// otherwise `fallback` (normally the file stem).
    #[must_use]
    pub fn playlist_title(&self, fallback: &str) -> String {
        match (self.artist.as_deref(), self.title.as_deref()) {
            (Some(artist), Some(title)) => format!("{artist} - {title}"),
            _ => fallback.to_string(),
        }
    }
}

/// Source of track metadata.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataReader {
    /// Read the metadata of one audio file.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidMedia`] when the file is not readable audio
    /// and a file system error when it does not exist.
    fn read(&self, path: &Path) -> Result<TrackMetadata>;
}

/// [`MetadataReader`] backed by the `id3` crate for tags and `lofty` for the
/// audio properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagReader;

impl TagReader {
    /// Create a new tag reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetadataReader for TagReader {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        if !path.exists() {
            return Err(Error::FileSystem(FileSystemError::NotFound {
                path: path.to_path_buf(),
            }));
        }

        debug!("Extracting metadata from: {}", path.display());

        let tagged = lofty::read_from_path(path).map_err(|e| {
            Error::Media(MediaError::InvalidMedia {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
        let duration_secs = tagged.properties().duration().as_secs_f64();

        let tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                debug!("No ID3 tag found in: {}", path.display());
                return Ok(TrackMetadata {
                    duration_secs,
                    ..TrackMetadata::empty()
                });
            }
            Err(e) => {
                warn!("Failed to read ID3 tag from {}: {}", path.display(), e);
                return Ok(TrackMetadata {
                    duration_secs,
                    ..TrackMetadata::empty()
                });
            }
        };

        let metadata = TrackMetadata {
            title: non_blank(tag.title()),
            artist: non_blank(tag.artist()),
            album: non_blank(tag.album()),
            genre: non_blank(tag.genre_parsed().as_deref()),
            duration_secs,
        };

        debug!(
            "Extracted metadata - title: {:?}, artist: {:?}, album: {:?}, genre: {:?}, duration: {:.1}s",
            metadata.title, metadata.artist, metadata.album, metadata.genre, metadata.duration_secs
        );

        Ok(metadata)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Read metadata, substituting empty metadata for per-file media failures.
///
/// # Errors
///
/// Only non-recoverable errors (missing file, I/O) are returned.
pub fn read_or_default(reader: &dyn MetadataReader, path: &Path) -> Result<TrackMetadata> {
    match reader.read(path) {
        Ok(metadata) => Ok(metadata),
        Err(e) if e.is_recoverable() => {
            warn!("Using default metadata for {}: {}", path.display(), e);
            Ok(TrackMetadata::empty())
        }
        Err(e) => Err(e),
    }
}
