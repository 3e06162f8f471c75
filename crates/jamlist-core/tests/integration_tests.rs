//! Integration tests for `Jamlist` core workflows.
//!
//! These tests drive whole commands against a temporary Jam root:
//! - process -> convert -> revert round trip
//! - repeated migrations from an outside playlist
//! - recovery from corrupt files during scans and migrations

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use jamlist_core::{
    ArtworkNormalizer, ArtworkOutcome, CoverArtNormalizer, Error, ErrorKind, JamRoot, MediaError,
    MetadataReader, MigrationEngine, MigrationOptions, PlaylistFlavor, Result, TrackMetadata,
    list_playlists, list_songs, playlist::load, playlist_songs, process,
};
use tempfile::TempDir;

// =============================================================================
// Test Fixtures and Utilities
// =============================================================================

/// Metadata reader answering from a table keyed by file name.
#[derive(Default)]
struct StubReader {
    tracks: HashMap<String, TrackMetadata>,
    corrupt: Vec<String>,
}

impl StubReader {
    fn with_track(
        mut self,
        file: &str,
        genre: &str,
        artist: &str,
        album: &str,
        title: &str,
        secs: f64,
    ) -> Self {
        self.tracks.insert(
            file.to_string(),
            TrackMetadata {
                title: Some(title.to_string()),
                artist: Some(artist.to_string()),
                album: Some(album.to_string()),
                genre: Some(genre.to_string()),
                duration_secs: secs,
            },
        );
        self
    }

    fn with_corrupt(mut self, file: &str) -> Self {
        self.corrupt.push(file.to_string());
        self
    }
}

impl MetadataReader for StubReader {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if self.corrupt.contains(&name) {
            return Err(Error::Media(MediaError::InvalidMedia {
                path: path.to_path_buf(),
                reason: "unreadable frame header".to_string(),
            }));
        }
        Ok(self.tracks.get(&name).cloned().unwrap_or_default())
    }
}

/// A temporary Jam root plus a directory outside of it.
struct TestFixture {
    temp_dir: TempDir,
    jam: JamRoot,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().join("SPORT PLUS");
        fs::create_dir_all(root.join("Music")).expect("create Music");
        fs::create_dir_all(root.join("Playlists")).expect("create Playlists");
        let jam = JamRoot::new(&root).expect("root exists");
        Self { temp_dir, jam }
    }

    fn outside(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }

    fn add_music(&self, relative: &str, content: &[u8]) -> PathBuf {
        write_file(&self.jam.music_path(relative), content)
    }
}

fn write_file(path: &Path, content: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, content).expect("write file");
    path.to_path_buf()
}

fn tagged_mp3(path: &Path, cover: &[u8]) -> PathBuf {
    write_file(path, &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00]);
    let mut tag = Tag::new();
    tag.set_artist("X");
    tag.add_frame(Picture {
        mime_type: "image/png".to_string(),
        picture_type: PictureType::CoverFront,
        description: String::new(),
        data: cover.to_vec(),
    });
    tag.write_to_path(path, Version::Id3v23).expect("write tag");
    path.to_path_buf()
}

fn mp3() -> Vec<String> {
    vec![".mp3".to_string()]
}

// =============================================================================
// Process / Convert / Revert
// =============================================================================

#[test]
fn test_process_convert_revert_round_trip() {
    let fx = TestFixture::new();
    fx.add_music("A/song.mp3", b"audio");
    let reader = StubReader::default().with_track("song.mp3", "Rock", "X", "Live", "Y", 180.4);
    let artwork = CoverArtNormalizer::default();

    let (playlist, path) = process(
        &fx.jam,
        Path::new("A"),
        "pl1",
        &mp3(),
        &reader,
        PlaylistFlavor::Device,
    )
    .expect("process");
    assert_eq!(playlist.len(), 1);
    assert_eq!(
        fs::read(&path).expect("read"),
        b"#EXTM3U\r\n#EXTINF:180, X - Y\r\n..\\A\\song.mp3\r\n"
    );

    let engine = MigrationEngine::new(&fx.jam, &reader, &artwork);
    let converted = engine.convert("pl1").expect("convert");
    assert_eq!(converted.moved, 1);
    assert!(fx.jam.music_path("Rock/X/Live/song.mp3").is_file());
    let entries = load(&path).expect("load converted");
    assert_eq!(entries[0].file, "..\\Rock\\X\\Live\\song.mp3");
    assert_eq!(entries[0].title, "X - Y");
    assert_eq!(entries[0].duration, 180.0);

    let reverted = engine.revert("pl1").expect("revert");
    assert_eq!(reverted.moved, 1);
    assert!(fx.jam.music_path("song.mp3").is_file());
    assert!(!fx.jam.music_path("Rock").exists());
    assert_eq!(
        fs::read(&path).expect("read"),
        b"#EXTM3U\r\n#EXTINF:180, X - Y\r\n..\\song.mp3\r\n"
    );
}

#[test]
fn test_convert_uses_placeholders_for_untagged_tracks() {
    let fx = TestFixture::new();
    fx.add_music("A/untagged.mp3", b"audio");
    let reader = StubReader::default();
    let artwork = CoverArtNormalizer::default();

    process(&fx.jam, Path::new("A"), "pl", &mp3(), &reader, PlaylistFlavor::Device)
        .expect("process");
    MigrationEngine::new(&fx.jam, &reader, &artwork)
        .convert("pl.m3u")
        .expect("convert");

    assert!(
        fx.jam
            .music_path("Unknown Genre/Unknown Artist/Unknown Album/untagged.mp3")
            .is_file()
    );
    assert_eq!(
        playlist_songs(&fx.jam, "pl").expect("songs"),
        vec!["untagged.mp3".to_string()]
    );
}

// =============================================================================
// Migrate
// =============================================================================

#[test]
fn test_migrate_twice_is_idempotent() {
    let fx = TestFixture::new();
    let downloads = fx.outside();
    write_file(&downloads.join("one.mp3"), b"one");
    write_file(&downloads.join("sub/two.mp3"), b"two");
    let source = write_file(
        &downloads.join("mix.m3u8"),
        b"#EXTM3U\n#EXTINF:61.9,A - One\none.mp3\n#EXTINF:62,B - Two\nsub\\two.mp3\n",
    );
    let reader = StubReader::default()
        .with_track("one.mp3", "Pop", "A", "First", "One", 61.9)
        .with_track("two.mp3", "Jazz", "B", "Second", "Two", 62.0);
    let artwork = CoverArtNormalizer::default();
    let engine = MigrationEngine::new(&fx.jam, &reader, &artwork);
    let options = MigrationOptions {
        use_hash: true,
        create_dir: false,
    };

    let first = engine.migrate(&source, "mix", options).expect("first run");
    assert_eq!(first.copied, 2);
    let first_bytes = fs::read(&first.playlist).expect("read playlist");
    assert_eq!(
        first_bytes,
        b"#EXTM3U\r\n#EXTINF:61, A - One\r\n..\\Pop\\A\\First\\one.mp3\r\n#EXTINF:62, B - Two\r\n..\\Jazz\\B\\Second\\two.mp3\r\n"
    );

    let second = engine.migrate(&source, "mix", options).expect("second run");
    assert_eq!(second.copied, 0);
    assert_eq!(second.already_present, 2);
    assert_eq!(fs::read(&second.playlist).expect("read playlist"), first_bytes);

    assert_eq!(list_playlists(&fx.jam).expect("list"), vec!["mix.m3u".to_string()]);
    assert_eq!(list_songs(&fx.jam, &mp3()).expect("songs").len(), 2);
}

#[test]
fn test_migrate_resolves_same_file_without_error() {
    let fx = TestFixture::new();
    fx.add_music("song.mp3", b"audio");
    let playlist = write_file(
        &fx.jam.playlist_path("device.m3u"),
        b"#EXTM3U\r\n#EXTINF:5, s\r\n..\\Music\\song.mp3\r\n",
    );
    let reader = StubReader::default();
    let artwork = CoverArtNormalizer::default();

    let report = MigrationEngine::new(&fx.jam, &reader, &artwork)
        .migrate(&playlist, "device", MigrationOptions::default())
        .expect("migrate");
    assert_eq!(report.same_file, 1);
    assert_eq!(report.copied, 0);
    assert_eq!(fs::read(fx.jam.music_path("song.mp3")).expect("read"), b"audio");
}

// =============================================================================
// Corrupt Files
// =============================================================================

#[test]
fn test_corrupt_cover_is_stripped_and_migration_continues() {
    let fx = TestFixture::new();
    let downloads = fx.outside();
    tagged_mp3(&downloads.join("broken.mp3"), b"\x89PNG truncated");
    write_file(&downloads.join("fine.mp3"), b"audio");
    let source = write_file(
        &downloads.join("mix.m3u"),
        b"#EXTINF:1, broken\nbroken.mp3\n#EXTINF:2, fine\nfine.mp3\n",
    );
    let reader = StubReader::default().with_corrupt("broken.mp3");
    let artwork = CoverArtNormalizer::default();

    let report = MigrationEngine::new(&fx.jam, &reader, &artwork)
        .migrate(
            &source,
            "mix",
            MigrationOptions {
                use_hash: true,
                create_dir: true,
            },
        )
        .expect("migrate");

    assert_eq!(report.entries, 2);
    assert_eq!(report.copied, 2);
    assert_eq!(report.artwork_changed, 1);

    let copied = fx
        .jam
        .music_path("mix/Unknown Genre/Unknown Artist/Unknown Album/broken.mp3");
    let tag = Tag::read_from_path(&copied).expect("tag kept");
    assert_eq!(tag.pictures().count(), 0);
    assert_eq!(tag.artist(), Some("X"));
    assert_eq!(
        Tag::read_from_path(downloads.join("broken.mp3"))
            .expect("source untouched")
            .pictures()
            .count(),
        1
    );
}

#[test]
fn test_scan_skips_corrupt_files() {
    let fx = TestFixture::new();
    fx.add_music("A/bad.mp3", b"garbage");
    fx.add_music("A/good.mp3", b"audio");
    let reader = StubReader::default()
        .with_corrupt("bad.mp3")
        .with_track("good.mp3", "Rock", "X", "Live", "Y", 10.0);

    let (playlist, _) = process(
        &fx.jam,
        Path::new("A"),
        "pl",
        &mp3(),
        &reader,
        PlaylistFlavor::Generic,
    )
    .expect("process continues past corrupt file");
    assert_eq!(playlist.name, "pl.m3u8");
    assert_eq!(playlist.len(), 1);
    assert_eq!(playlist.entries[0].file, "..\\A\\good.mp3");
}

#[test]
fn test_normalizer_leaves_plain_files_alone() {
    let fx = TestFixture::new();
    let path = fx.add_music("plain.mp3", b"audio");
    let outcome = CoverArtNormalizer::default()
        .normalize(&path)
        .expect("normalize");
    assert_eq!(outcome, ArtworkOutcome::NoArtwork);
}

#[test]
fn test_invalid_root() {
    let fx = TestFixture::new();
    let err = JamRoot::new(fx.temp_dir.path().join("not mounted")).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::InvalidRoot);
}
