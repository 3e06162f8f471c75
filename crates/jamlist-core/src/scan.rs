//! Directory scanning and playlist generation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, FileSystemError, Result};
use crate::jam::JamRoot;
use crate::metadata::MetadataReader;
use crate::path::to_device_path;
use crate::playlist::{self, Playlist, PlaylistEntry, PlaylistFlavor};

/// Whether the file name of `path` ends with one of `extensions`, ignoring case.
#[must_use]
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&ext.to_lowercase()))
}

/// Walk `directory` and build one entry per matching audio file.
///
/// Entries come in directory-walk order, which is not sorted. Files whose
/// metadata cannot be read are logged and left out.
///
/// # Errors
///
/// Returns an error if `directory` does not exist, is outside the Jam Music
/// directory, or a metadata read fails for a reason other than bad media.
pub fn scan(
    directory: &Path,
    extensions: &[String],
    jam: &JamRoot,
    reader: &dyn MetadataReader,
) -> Result<Vec<PlaylistEntry>> {
    if !directory.is_dir() {
        return Err(Error::FileSystem(FileSystemError::NotFound {
            path: directory.to_path_buf(),
        }));
    }

    info!("Scanning {}", directory.display());
    let mut entries = Vec::new();

    for entry in WalkDir::new(directory)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !matches_extension(path, extensions) {
            debug!("Skipping {} (extension not selected)", path.display());
            continue;
        }

        let metadata = match reader.read(path) {
            Ok(metadata) => metadata,
            Err(e) if e.is_recoverable() => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let file = to_device_path(path, jam)?;
        debug!("* found: {}", file);

        entries.push(PlaylistEntry {
            title: metadata.playlist_title(stem),
            file,
            source_path: path.to_path_buf(),
            duration: metadata.duration_secs,
        });
    }

    Ok(entries)
}

/// Scan `<root>/Music/<directory>` and write the result as
/// `<root>/Playlists/<name>`.
///
/// # Errors
///
/// Returns an error if scanning or writing the playlist fails.
pub fn process(
    jam: &JamRoot,
    directory: &Path,
    name: &str,
    extensions: &[String],
    reader: &dyn MetadataReader,
    flavor: PlaylistFlavor,
) -> Result<(Playlist, PathBuf)> {
    playlist::validate_playlist_name(name)?;
    let entries = scan(&jam.music_path(directory), extensions, jam, reader)?;
    let playlist = Playlist::new(name, entries, flavor);
    let (path, _) = playlist::store(
        &jam.playlists_dir(),
        &playlist.name,
        &playlist.entries,
        flavor,
    )?;
    Ok((playlist, path))
}
