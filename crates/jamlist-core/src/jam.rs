//! Jam root handling.
//!
//! A Jam root is the mount point of the player. It holds two fixed
//! subdirectories: `Music` for audio and `Playlists` for playlist files.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Subdirectory holding audio files.
pub const MUSIC_DIR: &str = "Music";

/// Subdirectory holding playlist files.
pub const PLAYLIST_DIR: &str = "Playlists";

/// Known mount points of the player, keyed by `std::env::consts::OS`.
/// Platforms mapped to `None` have no stable mount point and need an explicit root.
const PLATFORM_ROOTS: &[(&str, Option<&str>)] = &[
    ("windows", None),
    ("macos", Some("/Volumes/SPORT PLUS")),
    ("linux", None),
];

/// A validated Jam root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamRoot {
    root: PathBuf,
}

impl JamRoot {
    /// Wrap an existing directory as a Jam root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] if the directory does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::invalid_root(
                Some(root.clone()),
                format!("{} is not an existing directory", root.display()),
            ));
        }
        debug!("Using Jam root {}", root.display());
        Ok(Self { root })
    }

    /// Resolve the Jam root from an explicit value or, failing that, the
    /// platform default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] if nothing resolves or the directory is missing.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_for(explicit, std::env::consts::OS)
    }

    /// Same as [`JamRoot::resolve`] with the platform given explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] if nothing resolves or the directory is missing.
    pub fn resolve_for(explicit: Option<&Path>, os: &str) -> Result<Self> {
        if let Some(root) = explicit {
            return Self::new(root);
        }

        let default = default_root_for(os)?;
        info!("No Jam root given, using {} default {}", os, default.display());
        Self::new(default)
    }

    /// The root directory itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// `<root>/Music`.
    #[must_use]
    pub fn music_dir(&self) -> PathBuf {
        self.root.join(MUSIC_DIR)
    }

    /// `<root>/Playlists`.
    #[must_use]
    pub fn playlists_dir(&self) -> PathBuf {
        self.root.join(PLAYLIST_DIR)
    }

    /// `<root>/Music/<relative>`.
    #[must_use]
    pub fn music_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.music_dir().join(relative)
    }

    /// `<root>/Playlists/<relative>`.
    #[must_use]
    pub fn playlist_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.playlists_dir().join(relative)
    }
}

/// Look up the default mount point for a platform.
///
/// # Errors
///
/// Returns [`Error::InvalidRoot`] for unknown platforms and for platforms
/// without a default.
pub fn default_root_for(os: &str) -> Result<PathBuf> {
    match PLATFORM_ROOTS.iter().find(|(name, _)| *name == os) {
        Some((_, Some(root))) => Ok(PathBuf::from(root)),
        Some((_, None)) => Err(Error::invalid_root(
            None,
            format!("no default Jam root on {os}, please set --jam-root"),
        )),
        None => Err(Error::invalid_root(
            None,
            format!("unsupported platform {os}, please set --jam-root"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_subdirectories() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let jam = JamRoot::new(temp_dir.path()).expect("root exists");

        assert_eq!(jam.path(), temp_dir.path());
        assert_eq!(jam.music_dir(), temp_dir.path().join("Music"));
        assert_eq!(jam.playlists_dir(), temp_dir.path().join("Playlists"));
        assert_eq!(
            jam.music_path("A/song.mp3"),
            temp_dir.path().join("Music").join("A/song.mp3")
        );
        assert_eq!(
            jam.playlist_path("run.m3u"),
            temp_dir.path().join("Playlists").join("run.m3u")
        );
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let err = JamRoot::new("/nonexistent/jam/root").expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidRoot);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let file = temp_dir.path().join("file");
        std::fs::write(&file, "x").expect("write file");

        let err = JamRoot::new(&file).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidRoot);
    }

    #[test]
    fn test_explicit_root_wins() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let jam = JamRoot::resolve_for(Some(temp_dir.path()), "linux").expect("resolves");
        assert_eq!(jam.path(), temp_dir.path());
    }

    #[test]
    fn test_platform_defaults() {
        assert_eq!(
            default_root_for("macos").expect("macos has a default"),
            PathBuf::from("/Volumes/SPORT PLUS")
        );
        assert_eq!(
            default_root_for("linux").expect_err("no default").kind(),
            ErrorKind::InvalidRoot
        );
        assert_eq!(
            default_root_for("windows").expect_err("no default").kind(),
            ErrorKind::InvalidRoot
        );
        assert_eq!(
            default_root_for("haiku").expect_err("unsupported").kind(),
            ErrorKind::InvalidRoot
        );
    }

    #[test]
    fn test_resolve_without_root_on_linux_fails() {
        let err = JamRoot::resolve_for(None, "linux").expect_err("must fail");
        assert!(err.to_string().contains("--jam-root"));
    }
}
