//! Track migration between the source, flat and hashed layouts.
//!
//! Three modes move audio around and rewrite the playlist that references it:
//!
//! - [`MigrationEngine::migrate`] copies the tracks of an arbitrary playlist
//!   into the Jam Music tree and writes a device playlist for them
//! - [`MigrationEngine::convert`] moves the tracks of a flat device playlist
//!   into `Music/<Genre>/<Artist>/<Album>/`
//! - [`MigrationEngine::revert`] moves them back to `Music/<file>`
//!
//! Every mode is safe to re-run. Existing targets are never overwritten, and a
//! source that already is the target is a no-op.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::artwork::ArtworkNormalizer;
use crate::error::{Error, Result};
use crate::fs::{FileOutcome, copy_if_absent, find_file_by_name, move_if_absent, prune_empty_dirs};
use crate::jam::JamRoot;
use crate::metadata::{MetadataReader, read_or_default};
use crate::path::{from_device_path, hash_path, to_device_path, unhash_path};
use crate::playlist::{self, PlaylistEntry, PlaylistFlavor};

// =============================================================================
// Options
// =============================================================================

/// Options for [`MigrationEngine::migrate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Place tracks under `<Genre>/<Artist>/<Album>/`.
    pub use_hash: bool,
    /// Place tracks under a folder named after the playlist.
    pub create_dir: bool,
}

// =============================================================================
// Report
// =============================================================================

/// Summary of one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Number of playlist entries processed.
    pub entries: usize,
    /// Files copied.
    pub copied: usize,
    /// Files moved.
    pub moved: usize,
    /// Targets that already existed and were left alone.
    pub already_present: usize,
    /// Entries whose source already was the target.
    pub same_file: usize,
    /// Files whose embedded artwork was resized or removed.
    pub artwork_changed: usize,
    /// Playlist written at the end of the run.
    pub playlist: PathBuf,
}

impl MigrationReport {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Copied => self.copied += 1,
            FileOutcome::Moved => self.moved += 1,
            FileOutcome::AlreadyPresent => self.already_present += 1,
            FileOutcome::SameFile => self.same_file += 1,
        }
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} entries ({} copied, {} moved, {} already present, {} unchanged, {} covers fixed)",
            self.entries,
            self.copied,
            self.moved,
            self.already_present,
            self.same_file,
            self.artwork_changed
        )
    }
}

// =============================================================================
// Migration Engine
// =============================================================================

/// Moves tracks between layouts and keeps their playlist in sync.
///
/// The engine is the only writer of the Jam root while it runs. It aborts on
/// the first fatal error; files already handled stay where they are, which is
/// fine since every step is idempotent.
pub struct MigrationEngine<'a> {
    jam: &'a JamRoot,
    reader: &'a dyn MetadataReader,
    artwork: &'a dyn ArtworkNormalizer,
}

impl<'a> MigrationEngine<'a> {
    /// Create an engine working on `jam`.
    #[must_use]
    pub fn new(
        jam: &'a JamRoot,
        reader: &'a dyn MetadataReader,
        artwork: &'a dyn ArtworkNormalizer,
    ) -> Self {
        Self {
            jam,
            reader,
            artwork,
        }
    }

    /// Copy the tracks of `source_playlist` into the Jam and write
    /// `Playlists/<name>` referencing the copies.
    ///
    /// Relative URIs are resolved against the directory of `source_playlist`.
    /// Tracks land as `Music/<file>`, or `Music/<name>/<file>` with
    /// `create_dir`; `use_hash` inserts the genre/artist/album folders read from
    /// the source file. Artwork of freshly copied files is normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the source playlist is missing or malformed, a track
    /// is missing, or a file operation fails.
    pub fn migrate(
        &self,
        source_playlist: &Path,
        name: &str,
        options: MigrationOptions,
    ) -> Result<MigrationReport> {
        playlist::validate_playlist_name(name)?;
        let entries = playlist::load(source_playlist)?;
        let base = source_playlist.parent().unwrap_or_else(|| Path::new(""));

        let file_name = playlist::playlist_file_name(name, PlaylistFlavor::Device);
        let target_dir = if options.create_dir {
            let folder = Path::new(&file_name)
                .file_stem()
                .map_or_else(|| PathBuf::from(name), PathBuf::from);
            self.jam.music_dir().join(folder)
        } else {
            self.jam.music_dir()
        };

        info!(
            "Migrating {} entries from {} into {}",
            entries.len(),
            source_playlist.display(),
            target_dir.display()
        );

        let mut report = MigrationReport::default();
        let mut migrated = Vec::with_capacity(entries.len());

        for entry in entries {
            let source = resolve_source(&entry.file, base);
            let track_name = source
                .file_name()
                .ok_or_else(|| Error::malformed_path(&source, "entry has no file name"))?;

            let flat = target_dir.join(track_name);
            let target = if options.use_hash {
                let metadata = read_or_default(self.reader, &source)?;
                hash_path(&flat, &metadata)
            } else {
                flat
            };

            let file = to_device_path(&target, self.jam)?;
            let outcome = copy_if_absent(&source, &target)?;
            report.record(outcome);
            if outcome == FileOutcome::Copied {
                self.normalize_artwork(&target, &mut report);
            }

            migrated.push(relocated(entry, target, file));
        }

        let (path, count) = playlist::store(
            &self.jam.playlists_dir(),
            &file_name,
            &migrated,
            PlaylistFlavor::Device,
        )?;
        report.entries = count;
        report.playlist = path;
        Ok(report)
    }

    /// Move the tracks of a flat device playlist into the hashed layout and
    /// rewrite the playlist in place.
    ///
    /// A track missing from its recorded location is searched for by file name
    /// under Music.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist is missing or malformed, a track cannot
    /// be found, or a move fails.
    pub fn convert(&self, name: &str) -> Result<MigrationReport> {
        let playlist_path = playlist::find_playlist(&self.jam.playlists_dir(), name)?;
        let entries = playlist::load(&playlist_path)?;
        let music_dir = self.jam.music_dir();
        info!("Converting {} to the hashed layout", playlist_path.display());

        let mut report = MigrationReport::default();
        let mut converted = Vec::with_capacity(entries.len());

        for entry in entries {
            let source = self.locate(&entry)?;
            let track_name = source
                .file_name()
                .ok_or_else(|| Error::malformed_path(&source, "entry has no file name"))?;

            let metadata = read_or_default(self.reader, &source)?;
            let target = hash_path(&music_dir.join(track_name), &metadata);

            let file = to_device_path(&target, self.jam)?;
            report.record(move_if_absent(&source, &target)?);
            converted.push(relocated(entry, target, file));
        }

        report.entries = playlist::store_at(&playlist_path, &converted, PlaylistFlavor::Device)?;
        report.playlist = playlist_path;
        Ok(report)
    }

    /// Move the tracks of a hashed device playlist back to `Music/<file>` and
    /// rewrite the playlist in place. Emptied genre/artist/album folders are
    /// removed.
    ///
    /// Entries that are already flat are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist is missing or malformed, an entry is
    /// neither flat nor exactly `<Genre>\<Artist>\<Album>\<file>`, or a move
    /// fails.
    pub fn revert(&self, name: &str) -> Result<MigrationReport> {
        let playlist_path = playlist::find_playlist(&self.jam.playlists_dir(), name)?;
        let entries = playlist::load(&playlist_path)?;
        let music_dir = self.jam.music_dir();
        info!("Reverting {} to the flat layout", playlist_path.display());

        let mut report = MigrationReport::default();
        let mut reverted = Vec::with_capacity(entries.len());

        for entry in entries {
            let relative = from_device_path(&entry.file);
            let hashed = music_dir.join(&relative);
            let target = if relative.components().count() == 1 {
                hashed.clone()
            } else {
                music_dir.join(unhash_path(&hashed, self.jam)?)
            };

            let file = to_device_path(&target, self.jam)?;
            let outcome = move_if_absent(&hashed, &target)?;
            report.record(outcome);
            if outcome == FileOutcome::Moved
                && let Some(parent) = hashed.parent()
            {
                prune_empty_dirs(parent, &music_dir);
            }

            reverted.push(relocated(entry, target, file));
        }

        report.entries = playlist::store_at(&playlist_path, &reverted, PlaylistFlavor::Device)?;
        report.playlist = playlist_path;
        Ok(report)
    }

    /// Where the track of a device playlist entry currently lives.
    fn locate(&self, entry: &PlaylistEntry) -> Result<PathBuf> {
        let expected = self.jam.music_path(from_device_path(&entry.file));
        if expected.is_file() {
            return Ok(expected);
        }

        let name = entry.file_name();
        let music_dir = self.jam.music_dir();
        debug!("{} not found, searching {}", expected.display(), music_dir.display());
        find_file_by_name(&music_dir, name).ok_or_else(|| Error::TrackNotFound {
            name: name.to_string(),
            search_root: music_dir,
        })
    }

    fn normalize_artwork(&self, path: &Path, report: &mut MigrationReport) {
        match self.artwork.normalize(path) {
            Ok(outcome) if outcome.modified() => {
                debug!("Artwork of {} normalized: {:?}", path.display(), outcome);
                report.artwork_changed += 1;
            }
            Ok(_) => {}
            Err(e) => warn!("Could not normalize artwork of {}: {}", path.display(), e),
        }
    }
}

/// Point `entry` at `target`, whose device path is `file`. The device path is
/// computed before the track is touched, so a bad target aborts the run early.
fn relocated(entry: PlaylistEntry, target: PathBuf, file: String) -> PlaylistEntry {
    PlaylistEntry {
        file,
        source_path: target,
        ..entry
    }
}

/// Resolve a playlist URI to a file path. Backslashes are treated as
/// separators; relative URIs are taken relative to `base`.
fn resolve_source(uri: &str, base: &Path) -> PathBuf {
    let path = PathBuf::from(uri.replace('\\', "/"));
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
