//! Translation between the path schemes used by the player.
//!
//! Four representations are involved:
//!
//! - absolute file system paths (`<root>/Music/A/song.mp3`)
//! - device paths, as written in playlists (`..\A\song.mp3`), always with
//!   backslashes whatever the host OS
//! - Music-relative paths (`A/song.mp3`)
//! - hashed paths (`<dir>/<Genre>/<Artist>/<Album>/song.mp3`)
//!
//! Everything here is pure string/path composition. No function touches the
//! file system.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, PathError, Result};
use crate::jam::JamRoot;
use crate::metadata::{TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_GENRE};

/// Prefix of every device path.
pub const DEVICE_PREFIX: &str = "..\\";

/// Separator used inside device paths.
pub const DEVICE_SEPARATOR: &str = "\\";

/// Number of segments below Music in a hashed path: genre, artist, album, file.
pub const HASHED_DEPTH: usize = 4;

/// Characters that cannot appear in a directory name on the player's FAT file system.
const INVALID_SEGMENT_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Convert an absolute path under `<root>/Music` into a device path.
///
/// # Errors
///
/// Returns [`Error::InvalidRoot`] if `path` is not under the Music directory
/// and [`PathError::NotUnicode`] if it is not valid UTF-8.
pub fn to_device_path(path: &Path, jam: &JamRoot) -> Result<String> {
    let music_dir = jam.music_dir();
    let relative = path.strip_prefix(&music_dir).map_err(|_| {
        Error::invalid_root(
            Some(jam.path().to_path_buf()),
            format!(
                "{} is not under {}",
                path.display(),
                music_dir.display()
            ),
        )
    })?;

    let segments = normal_segments(relative)?;
    if segments.is_empty() {
        return Err(Error::malformed_path(path, "path names the Music directory itself"));
    }

    Ok(format!("{DEVICE_PREFIX}{}", segments.join(DEVICE_SEPARATOR)))
}

/// Convert a device path into a path relative to `<root>/Music`.
///
/// Backslashes become separators and leading `..` segments are dropped.
#[must_use]
pub fn from_device_path(device_path: &str) -> PathBuf {
    device_path
        .split(['\\', '/'])
        .skip_while(|segment| *segment == ".." || *segment == ".")
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Insert `<Genre>/<Artist>/<Album>` between the directory and the file name of
/// `path`. Missing tag values map to the `Unknown ...` placeholders.
#[must_use]
pub fn hash_path(path: &Path, metadata: &TrackMetadata) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut hashed = dir.join(sanitize_segment(metadata.genre_or_default(), UNKNOWN_GENRE));
    hashed.push(sanitize_segment(metadata.artist_or_default(), UNKNOWN_ARTIST));
    hashed.push(sanitize_segment(metadata.album_or_default(), UNKNOWN_ALBUM));
    if let Some(name) = path.file_name() {
        hashed.push(name);
    }
    hashed
}

/// Strip the genre/artist/album segments from a hashed path, returning the flat
/// path relative to `<root>/Music`.
///
/// # Errors
///
/// Returns [`Error::InvalidRoot`] if the path is not under Music and
/// [`PathError::Malformed`] unless it is exactly `Music/<G>/<A>/<Al>/<file>`.
pub fn unhash_path(hashed: &Path, jam: &JamRoot) -> Result<PathBuf> {
    let music_dir = jam.music_dir();
    let relative = hashed.strip_prefix(&music_dir).map_err(|_| {
        Error::invalid_root(
            Some(jam.path().to_path_buf()),
            format!(
                "{} is not under {}",
                hashed.display(),
                music_dir.display()
            ),
        )
    })?;

    let segments = normal_segments(relative)?;
    if segments.len() != HASHED_DEPTH {
        return Err(Error::malformed_path(
            hashed,
            format!(
                "expected {HASHED_DEPTH} segments below Music (genre/artist/album/file), found {}",
                segments.len()
            ),
        ));
    }

    Ok(PathBuf::from(segments[HASHED_DEPTH - 1]))
}

/// Make a tag value usable as a single directory name.
///
/// Separators and characters the player's file system rejects become `_`;
/// surrounding whitespace and trailing dots are removed. Results made only of
/// dots, underscores and blanks (including `.` and `..`) fall back to
/// `placeholder`.
#[must_use]
pub fn sanitize_segment(value: &str, placeholder: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if INVALID_SEGMENT_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned
        .chars()
        .all(|c| matches!(c, '.' | '_') || c.is_whitespace())
    {
        placeholder.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Split a relative path into its UTF-8 segments, rejecting anything other than
/// plain names.
fn normal_segments(relative: &Path) -> Result<Vec<&str>> {
    relative
        .components()
        .map(|component| match component {
            Component::Normal(name) => name.to_str().ok_or_else(|| {
                Error::Path(PathError::NotUnicode {
                    path: relative.to_path_buf(),
                })
            }),
            _ => Err(Error::malformed_path(
                relative,
                "unexpected non-normal path component",
            )),
        })
        .collect()
}
