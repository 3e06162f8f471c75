//! Command-line interface for jamlist.
//!
//! Provides commands for building playlists from the Jam Music folder,
//! migrating outside playlists onto the Jam, switching tracks between the flat
//! and hashed layouts, and listing songs and playlists.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::debug;

use jamlist_core::{
    CoverArtNormalizer, JamConfig, JamRoot, MigrationEngine, MigrationOptions, MigrationReport,
    PlaylistFlavor, TagReader, list_playlists, list_songs, playlist_songs, process,
};

/// jamlist - Playlist builder and track migrator for Jam players
#[derive(Parser, Debug)]
#[command(name = "jamlist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Jam root directory (defaults to the config file, then the platform mount point)
    #[arg(short, long, global = true, env = "JAM_ROOT")]
    pub jam_root: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to <config dir>/jamlist/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for JSON log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan Music/<directory> and write Playlists/<playlist>
    Process {
        /// Directory under Music to scan
        directory: PathBuf,

        /// Playlist name (.m3u is appended unless it ends in .m3u or .m3u8)
        playlist: String,

        /// Playlist dialect
        #[arg(short, long, value_enum, default_value = "device")]
        format: PlaylistFormat,
    },

    /// Copy the tracks of a playlist onto the Jam and write a device playlist
    Migrate {
        /// Playlist file to read
        source_playlist: PathBuf,

        /// Name of the playlist to write under Playlists
        playlist: String,

        /// Place tracks under <Genre>/<Artist>/<Album>
        #[arg(long)]
        hash: bool,

        /// Place tracks under a folder named after the playlist
        #[arg(long)]
        create_dir: bool,
    },

    /// Move the tracks of a playlist into the hashed layout
    Convert {
        /// Playlist name under Playlists
        playlist: String,
    },

    /// Move the tracks of a hashed playlist back to Music
    Revert {
        /// Playlist name under Playlists
        playlist: String,
    },

    /// List all songs under Music
    #[command(name = "list_songs")]
    ListSongs,

    /// List playlists, or the songs of one playlist
    #[command(name = "list_playlists")]
    ListPlaylists {
        /// Playlist whose songs to list
        playlist: Option<String>,
    },
}

/// Playlist dialect for the CLI (maps to `PlaylistFlavor`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaylistFormat {
    /// CRLF line endings, .m3u
    Device,

    /// LF line endings, .m3u8
    Generic,
}

impl From<PlaylistFormat> for PlaylistFlavor {
    fn from(format: PlaylistFormat) -> Self {
        match format {
            PlaylistFormat::Device => Self::Device,
            PlaylistFormat::Generic => Self::Generic,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the Jam root is invalid or the command fails.
    pub fn execute(self, config: &JamConfig) -> Result<()> {
        let root = self.jam_root.as_deref().or(config.jam_root.as_deref());
        let jam = JamRoot::resolve(root).context("Could not open the Jam")?;
        debug!("Jam root: {}", jam.path().display());

        let reader = TagReader::new();
        let artwork = CoverArtNormalizer::new(config.artwork).with_tag_dump(self.verbose > 2);
        let engine = MigrationEngine::new(&jam, &reader, &artwork);

        match self.command {
            Commands::Process {
                directory,
                playlist,
                format,
            } => {
                let (playlist, path) = process(
                    &jam,
                    &directory,
                    &playlist,
                    &config.extensions,
                    &reader,
                    format.into(),
                )
                .with_context(|| format!("Failed to process {}", directory.display()))?;
                println!("Wrote {}", path.display());
                println!("Total: {} songs", playlist.len());
                Ok(())
            }
            Commands::Migrate {
                source_playlist,
                playlist,
                hash,
                create_dir,
            } => {
                let options = MigrationOptions {
                    use_hash: hash || config.use_hash,
                    create_dir: create_dir || config.create_dir,
                };
                let report = engine
                    .migrate(&source_playlist, &playlist, options)
                    .with_context(|| format!("Failed to migrate {}", source_playlist.display()))?;
                print_report(&report);
                Ok(())
            }
            Commands::Convert { playlist } => {
                let report = engine
                    .convert(&playlist)
                    .with_context(|| format!("Failed to convert {playlist}"))?;
                print_report(&report);
                Ok(())
            }
            Commands::Revert { playlist } => {
                let report = engine
                    .revert(&playlist)
                    .with_context(|| format!("Failed to revert {playlist}"))?;
                print_report(&report);
                Ok(())
            }
            Commands::ListSongs => {
                let songs = list_songs(&jam, &config.extensions)?;
                for song in &songs {
                    println!("{}", song.display());
                }
                println!("Total: {} songs", songs.len());
                Ok(())
            }
            Commands::ListPlaylists { playlist: None } => {
                let playlists = list_playlists(&jam)?;
                for name in &playlists {
                    println!("{name}");
                }
                println!("Total: {} playlists", playlists.len());
                Ok(())
            }
            Commands::ListPlaylists {
                playlist: Some(name),
            } => {
                let songs = playlist_songs(&jam, &name)?;
                for song in &songs {
                    println!("{song}");
                }
                println!("Total: {} songs", songs.len());
                Ok(())
            }
        }
    }
}

fn print_report(report: &MigrationReport) {
    println!("Wrote {}", report.playlist.display());
    println!("{report}");
}
