//! `Jamlist` Core Library
//!
//! This crate provides the core functionality for managing playlists on a Jam
//! portable player:
//! - Path translation between file system, device, and hashed layouts
//! - Extended M3U playlist parsing and writing
//! - Directory scanning into playlists
//! - Track migration (copy into the Jam, convert to and from the hashed layout)
//! - Embedded cover art normalization
//! - Song and playlist listings
//!
//! # Error Handling
//!
//! Errors are typed per domain. See the [`error`] module for details.
//!
//! ```rust,ignore
//! use jamlist_core::{JamRoot, Result};
//!
//! fn songs() -> Result<()> {
//!     let jam = JamRoot::resolve(None)?;
//!     for song in jamlist_core::list_songs(&jam, &[".mp3".to_string()])? {
//!         println!("{}", song.display());
//!     }
//!     Ok(())
//! }
//! ```

pub mod artwork;
pub mod config;
pub mod error;
pub mod fs;
pub mod jam;
pub mod library;
pub mod metadata;
pub mod migrate;
pub mod path;
pub mod playlist;
pub mod scan;

pub use artwork::{ArtworkNormalizer, ArtworkOutcome, CoverArtNormalizer};
pub use config::{ArtworkSettings, DEFAULT_EXTENSIONS, JamConfig};
pub use error::{
    Error, ErrorKind, FileSystemError, MediaError, PathError, PlaylistError, Result,
};
pub use fs::FileOutcome;
pub use jam::{JamRoot, MUSIC_DIR, PLAYLIST_DIR, default_root_for};
pub use library::{list_playlists, list_songs, playlist_songs};
pub use metadata::{MetadataReader, TagReader, TrackMetadata};
pub use migrate::{MigrationEngine, MigrationOptions, MigrationReport};
pub use path::{from_device_path, hash_path, to_device_path, unhash_path};
pub use playlist::{Playlist, PlaylistEntry, PlaylistFlavor, find_playlist};
pub use scan::{process, scan};
