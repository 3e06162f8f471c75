//! Playlist model and the extended M3U codec.
//!
//! The player reads `#EXTM3U` playlists:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:180, X - Y
//! ..\A\song.mp3
//! ```
//!
//! Device playlists use CRLF line endings and the `.m3u` extension. Generic
//! playlists use plain newlines and default to `.m3u8`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, PlaylistError, Result};
use crate::fs::{read_text, write_text};

/// Header directive of an extended M3U file.
pub const HEADER: &str = "#EXTM3U";

/// Directive carrying duration and title of the next URI.
pub const EXTINF: &str = "#EXTINF:";

/// Extensions accepted as playlist files.
pub const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8"];

/// One track of a playlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistEntry {
    /// Display title.
    pub title: String,
    /// URI as written in the playlist (a device path for Jam playlists).
    pub file: String,
    /// Where the audio file lives on this machine.
    pub source_path: PathBuf,
    /// Duration in seconds.
    pub duration: f64,
}

impl PlaylistEntry {
    /// File name part of the URI, whatever separator it uses.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

/// Which playlist dialect to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistFlavor {
    /// Jam player playlists: CRLF, `.m3u`.
    #[default]
    Device,
    /// Plain playlists: LF, `.m3u8`.
    Generic,
}

impl PlaylistFlavor {
    /// Line terminator.
    #[must_use]
    pub const fn line_ending(self) -> &'static str {
        match self {
            Self::Device => "\r\n",
            Self::Generic => "\n",
        }
    }

    /// Extension appended to names that have none.
    #[must_use]
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Device => "m3u",
            Self::Generic => "m3u8",
        }
    }
}

impl std::fmt::Display for PlaylistFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// An ordered list of entries with the name it is stored under.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    /// File name, including the extension.
    pub name: String,
    /// Entries in play order.
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Create a playlist, normalizing the name's extension for `flavor`.
    #[must_use]
    pub fn new(name: &str, entries: Vec<PlaylistEntry>, flavor: PlaylistFlavor) -> Self {
        Self {
            name: playlist_file_name(name, flavor),
            entries,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the playlist has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `name` already carries a playlist extension.
#[must_use]
pub fn has_playlist_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PLAYLIST_EXTENSIONS.contains(&ext))
}

/// File name for a playlist: `name` unchanged if it ends in `.m3u`/`.m3u8`,
/// otherwise `name` plus the flavor's default extension.
#[must_use]
pub fn playlist_file_name(name: &str, flavor: PlaylistFlavor) -> String {
    if has_playlist_extension(name) {
        name.to_string()
    } else {
        format!("{name}.{}", flavor.default_extension())
    }
}

/// Validate a playlist name.
///
/// # Errors
///
/// Returns an error if the name is empty, too long, or contains characters that
/// cannot appear in a file name.
pub fn validate_playlist_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Playlist(PlaylistError::InvalidName {
            name: name.to_string(),
            reason: "Playlist name cannot be empty".to_string(),
        }));
    }

    if name.len() > 255 {
        return Err(Error::Playlist(PlaylistError::InvalidName {
            name: name.to_string(),
            reason: "Playlist name too long".to_string(),
        }));
    }

    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    if name.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(Error::Playlist(PlaylistError::InvalidName {
            name: name.to_string(),
            reason: "Playlist name contains invalid characters".to_string(),
        }));
    }

    Ok(())
}

/// Locate an existing playlist in `dir`.
///
/// A name with a playlist extension is used as-is; otherwise `<name>.m3u` and
/// then `<name>.m3u8` are tried.
///
/// # Errors
///
/// Returns [`PlaylistError::NotFound`] if no candidate exists.
pub fn find_playlist(dir: &Path, name: &str) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = if has_playlist_extension(name) {
        vec![dir.join(name)]
    } else {
        PLAYLIST_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .collect()
    };

    if let Some(found) = candidates.iter().find(|candidate| candidate.is_file()) {
        return Ok(found.clone());
    }

    let path = candidates
        .into_iter()
        .next()
        .unwrap_or_else(|| dir.join(name));
    Err(Error::Playlist(PlaylistError::NotFound { path }))
}

/// Read and parse a playlist file.
///
/// # Errors
///
/// Returns [`PlaylistError::NotFound`] if the file is missing and
/// [`PlaylistError::Parse`] on malformed directives.
pub fn load(path: &Path) -> Result<Vec<PlaylistEntry>> {
    if !path.is_file() {
        return Err(Error::Playlist(PlaylistError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    let content = read_text(path)?;
    let entries = parse(&content, path)?;
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse playlist text. `origin` is only used in error messages.
///
/// # Errors
///
/// Returns [`PlaylistError::Parse`] on a non-numeric duration, an `#EXTINF`
/// directly followed by another `#EXTINF`, or a trailing `#EXTINF` without URI.
pub fn parse(content: &str, origin: &Path) -> Result<Vec<PlaylistEntry>> {
    let parse_error = |line: usize, reason: String| {
        Error::Playlist(PlaylistError::Parse {
            path: origin.to_path_buf(),
            line,
            reason,
        })
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = Vec::new();
    let mut pending: Option<(usize, f64, String)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(info) = line.strip_prefix(EXTINF) {
            if let Some((previous, _, _)) = pending {
                return Err(parse_error(
                    line_number,
                    format!("#EXTINF from line {previous} has no URI"),
                ));
            }
            let (duration, title) = info.split_once(',').unwrap_or((info, ""));
            let duration: f64 = duration.trim().parse().map_err(|_| {
                parse_error(line_number, format!("invalid duration '{}'", duration.trim()))
            })?;
            if !duration.is_finite() {
                return Err(parse_error(
                    line_number,
                    format!("invalid duration '{duration}'"),
                ));
            }
            pending = Some((line_number, duration, title.trim().to_string()));
            continue;
        }

        if line.starts_with('#') {
            // #EXTM3U and unsupported directives.
            continue;
        }

        let (title, duration) = match pending.take() {
            Some((_, duration, title)) => (title, duration),
            None => (uri_stem(line).to_string(), 0.0),
        };
        entries.push(PlaylistEntry {
            title,
            file: line.to_string(),
            source_path: PathBuf::from(line),
            duration,
        });
    }

    if let Some((line_number, _, _)) = pending {
        return Err(parse_error(line_number, "#EXTINF has no URI".to_string()));
    }

    Ok(entries)
}

fn uri_stem(uri: &str) -> &str {
    let name = uri.rsplit(['\\', '/']).next().unwrap_or(uri);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Render entries in the given flavor. Durations are written as whole seconds.
#[must_use]
pub fn serialize(entries: &[PlaylistEntry], flavor: PlaylistFlavor) -> String {
    let eol = flavor.line_ending();
    let mut out = String::with_capacity(16 + entries.len() * 64);
    out.push_str(HEADER);
    out.push_str(eol);
    for entry in entries {
        debug!("* adding: {}", entry.file);
        out.push_str(&format!(
            "{EXTINF}{}, {}{eol}",
            entry.duration.trunc() as i64,
            entry.title
        ));
        out.push_str(&entry.file);
        out.push_str(eol);
    }
    out
}

/// Write a playlist into `dir` and return its path and the number of entries.
///
/// # Errors
///
/// Returns an error if the name is invalid or the file cannot be written.
pub fn store(
    dir: &Path,
    name: &str,
    entries: &[PlaylistEntry],
    flavor: PlaylistFlavor,
) -> Result<(PathBuf, usize)> {
    validate_playlist_name(name)?;
    let target = dir.join(playlist_file_name(name, flavor));

    info!("Generating {} playlist: {}", flavor, target.display());
    write_text(&target, &serialize(entries, flavor))?;
    info!("Added {} files", entries.len());

    Ok((target, entries.len()))
}

/// Write a playlist to an exact path (used to rewrite a playlist in place).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn store_at(path: &Path, entries: &[PlaylistEntry], flavor: PlaylistFlavor) -> Result<usize> {
    info!("Rewriting {} playlist: {}", flavor, path.display());
    write_text(path, &serialize(entries, flavor))?;
    Ok(entries.len())
}
