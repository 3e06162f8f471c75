//! Listings of the songs and playlists on a Jam.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::{Error, FileSystemError, Result};
use crate::jam::JamRoot;
use crate::playlist::{self, has_playlist_extension};
use crate::scan::matches_extension;

/// All audio files under `<root>/Music`, relative to Music, sorted.
///
/// # Errors
///
/// Returns an error if the Music directory does not exist.
pub fn list_songs(jam: &JamRoot, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let music_dir = jam.music_dir();
    if !music_dir.is_dir() {
        return Err(Error::FileSystem(FileSystemError::NotFound { path: music_dir }));
    }

    let mut songs: Vec<PathBuf> = WalkDir::new(&music_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && matches_extension(entry.path(), extensions))
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(&music_dir)
                .ok()
                .map(PathBuf::from)
        })
        .collect();
    songs.sort();
    Ok(songs)
}

/// File names of the playlists under `<root>/Playlists`, sorted.
///
/// # Errors
///
/// Returns an error if the Playlists directory does not exist.
pub fn list_playlists(jam: &JamRoot) -> Result<Vec<String>> {
    let playlists_dir = jam.playlists_dir();
    if !playlists_dir.is_dir() {
        return Err(Error::FileSystem(FileSystemError::NotFound {
            path: playlists_dir,
        }));
    }

    let mut names: Vec<String> = WalkDir::new(&playlists_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| has_playlist_extension(name))
        .collect();
    names.sort();
    Ok(names)
}

/// File names of the songs a playlist references, in playlist order.
///
/// # Errors
///
/// Returns an error if the playlist cannot be found or parsed.
pub fn playlist_songs(jam: &JamRoot, name: &str) -> Result<Vec<String>> {
    let path = playlist::find_playlist(&jam.playlists_dir(), name)?;
    Ok(playlist::load(&path)?
        .iter()
        .map(|entry| entry.file_name().to_string())
        .collect())
}
