//! Embedded cover art normalization.
//!
//! The player chokes on large embedded covers. After a track lands on the
//! device its ID3 pictures are checked:
//!
//! - no tag or no picture: nothing to do
//! - picture that does not decode: every picture is removed
//! - picture larger than the bound: downsampled to fit (aspect ratio kept),
//!   converted to RGB and re-encoded as a small JPEG
//!
//! Only the tag is rewritten; the audio data is left alone.

use std::io::Cursor;
use std::path::Path;

use id3::frame::{Content, Picture, PictureType};
use id3::{Tag, TagLike};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, trace, warn};

use crate::config::ArtworkSettings;
use crate::error::{Error, MediaError, Result};

/// MIME type of re-encoded covers.
pub const JPEG_MIME: &str = "image/jpeg";

/// Description given to re-encoded covers.
pub const COVER_DESCRIPTION: &str = "Cover";

/// What normalization did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkOutcome {
    /// No tag, or a tag without pictures.
    NoArtwork,
    /// The cover already fits the bound.
    WithinBounds {
        /// Cover width.
        width: u32,
        /// Cover height.
        height: u32,
    },
    /// The cover was downsampled.
    Resized {
        /// Original size.
        from: (u32, u32),
        /// New size.
        to: (u32, u32),
    },
    /// The cover did not decode and was removed.
    Removed,
}

impl ArtworkOutcome {
    /// Whether the file was rewritten.
    #[must_use]
    pub const fn modified(&self) -> bool {
        matches!(self, Self::Resized { .. } | Self::Removed)
    }
}

/// Rewrites embedded artwork into something the player can display.
#[cfg_attr(test, mockall::automock)]
pub trait ArtworkNormalizer {
    /// Normalize the artwork of one audio file.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Artwork`] if the tag cannot be rewritten.
    fn normalize(&self, path: &Path) -> Result<ArtworkOutcome>;
}

/// [`ArtworkNormalizer`] working on ID3 `APIC` frames.
#[derive(Debug, Clone, Copy)]
pub struct CoverArtNormalizer {
    settings: ArtworkSettings,
    dump_tags: bool,
}

impl Default for CoverArtNormalizer {
    fn default() -> Self {
        Self::new(ArtworkSettings::default())
    }
}

impl CoverArtNormalizer {
    /// Create a normalizer with the given bounds and encoding settings.
    #[must_use]
    pub const fn new(settings: ArtworkSettings) -> Self {
        Self {
            settings,
            dump_tags: false,
        }
    }

    /// Log every frame of each inspected tag at trace level.
    #[must_use]
    pub const fn with_tag_dump(mut self, dump_tags: bool) -> Self {
        self.dump_tags = dump_tags;
        self
    }

    fn exceeds_bounds(&self, width: u32, height: u32) -> bool {
        width > self.settings.max_width || height > self.settings.max_height
    }

    /// Resize `image` into the bounds and encode it as JPEG, returning the
    /// encoded bytes and the new dimensions.
    fn encode_cover(
        &self,
        image: &DynamicImage,
    ) -> std::result::Result<(Vec<u8>, (u32, u32)), image::ImageError> {
        let resized = image.resize(
            self.settings.max_width,
            self.settings.max_height,
            FilterType::Lanczos3,
        );
        let rgb = resized.to_rgb8();

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder =
                JpegEncoder::new_with_quality(&mut buffer, self.settings.jpeg_quality);
            encoder.set_pixel_density(PixelDensity::dpi(self.settings.dpi));
            encoder.encode_image(&rgb)?;
        }
        Ok((buffer.into_inner(), resized.dimensions()))
    }

    fn dump(&self, path: &Path, tag: &Tag) {
        if !self.dump_tags {
            return;
        }
        trace!("---- {}", path.display());
        for frame in tag.frames() {
            match frame.content() {
                Content::Picture(picture) => trace!(
                    "{}: {} ({:?}, {} bytes)",
                    frame.id(),
                    picture.mime_type,
                    picture.picture_type,
                    picture.data.len()
                ),
                content => trace!("{}: {}", frame.id(), content),
            }
        }
    }
}

impl ArtworkNormalizer for CoverArtNormalizer {
    fn normalize(&self, path: &Path) -> Result<ArtworkOutcome> {
        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                debug!("No ID3 tag in {}", path.display());
                return Ok(ArtworkOutcome::NoArtwork);
            }
            Err(e) => {
                warn!("Invalid MP3 file, skipping artwork: {} ({})", path.display(), e);
                return Ok(ArtworkOutcome::NoArtwork);
            }
        };
        self.dump(path, &tag);

        let Some(picture) = tag.pictures().next() else {
            return Ok(ArtworkOutcome::NoArtwork);
        };

        let decoded = match image::load_from_memory(&picture.data) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Invalid cover in {}, removing it: {}", path.display(), e);
                tag.remove_all_pictures();
                write_tag(&tag, path)?;
                return Ok(ArtworkOutcome::Removed);
            }
        };

        let (width, height) = decoded.dimensions();
        if !self.exceeds_bounds(width, height) {
            return Ok(ArtworkOutcome::WithinBounds { width, height });
        }

        let (data, new_size) = self.encode_cover(&decoded).map_err(|e| {
            Error::Media(MediaError::Artwork {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
        debug!(
            "Resizing cover of {} from {}x{} to {}x{}",
            path.display(),
            width,
            height,
            new_size.0,
            new_size.1
        );

        tag.remove_all_pictures();
        tag.add_frame(Picture {
            mime_type: JPEG_MIME.to_string(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data,
        });
        write_tag(&tag, path)?;

        Ok(ArtworkOutcome::Resized {
            from: (width, height),
            to: new_size,
        })
    }
}

fn write_tag(tag: &Tag, path: &Path) -> Result<()> {
    tag.write_to_path(path, tag.version()).map_err(|e| {
        Error::Media(MediaError::Artwork {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use id3::Version;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const FAKE_AUDIO: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00];

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .expect("encode png");
        buffer.into_inner()
    }

    fn track_with_picture(dir: &Path, data: Option<Vec<u8>>) -> PathBuf {
        let path = dir.join("track.mp3");
        fs::write(&path, FAKE_AUDIO).expect("write audio");

        let mut tag = Tag::new();
        tag.set_title("Y");
        tag.set_artist("X");
        if let Some(data) = data {
            tag.add_frame(Picture {
                mime_type: "image/png".to_string(),
                picture_type: PictureType::CoverFront,
                description: String::new(),
                data,
            });
        }
        tag.write_to_path(&path, Version::Id3v24).expect("write tag");
        path
    }

    fn cover_of(path: &Path) -> Option<Picture> {
        Tag::read_from_path(path)
            .expect("read tag")
            .pictures()
            .next()
            .cloned()
    }

    #[test]
    fn test_file_without_tag_is_untouched() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("plain.mp3");
        fs::write(&path, FAKE_AUDIO).expect("write audio");

        let outcome = CoverArtNormalizer::default().normalize(&path).expect("normalize");
        assert_eq!(outcome, ArtworkOutcome::NoArtwork);
        assert_eq!(fs::read(&path).expect("read"), FAKE_AUDIO);
    }

    #[test]
    fn test_tag_without_picture() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = track_with_picture(temp_dir.path(), None);

        let outcome = CoverArtNormalizer::default().normalize(&path).expect("normalize");
        assert_eq!(outcome, ArtworkOutcome::NoArtwork);
    }

    #[test]
    fn test_small_cover_is_kept() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let original = png_bytes(300, 450);
        let path = track_with_picture(temp_dir.path(), Some(original.clone()));

        let outcome = CoverArtNormalizer::default().normalize(&path).expect("normalize");
        assert_eq!(outcome, ArtworkOutcome::WithinBounds { width: 300, height: 450 });
        assert!(!outcome.modified());
        assert_eq!(cover_of(&path).expect("cover kept").data, original);
    }

    #[test]
    fn test_large_cover_is_resized_keeping_aspect_ratio() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = track_with_picture(temp_dir.path(), Some(png_bytes(900, 600)));

        let outcome = CoverArtNormalizer::default()
            .with_tag_dump(true)
            .normalize(&path)
            .expect("normalize");
        assert_eq!(
            outcome,
            ArtworkOutcome::Resized {
                from: (900, 600),
                to: (450, 300)
            }
        );
        assert!(outcome.modified());

        let tag = Tag::read_from_path(&path).expect("read tag");
        assert_eq!(tag.pictures().count(), 1);
        assert_eq!(tag.title(), Some("Y"));
        let cover = cover_of(&path).expect("cover present");
        assert_eq!(cover.mime_type, JPEG_MIME);
        assert_eq!(cover.picture_type, PictureType::CoverFront);
        let decoded = image::load_from_memory(&cover.data).expect("decodes");
        assert_eq!(decoded.dimensions(), (450, 300));
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_corrupt_cover_is_removed() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = track_with_picture(temp_dir.path(), Some(b"definitely not an image".to_vec()));

        let outcome = CoverArtNormalizer::default().normalize(&path).expect("normalize");
        assert_eq!(outcome, ArtworkOutcome::Removed);

        let tag = Tag::read_from_path(&path).expect("tag still readable");
        assert_eq!(tag.pictures().count(), 0);
        assert_eq!(tag.artist(), Some("X"));
        let raw = fs::read(&path).expect("read");
        assert!(raw.ends_with(FAKE_AUDIO));
    }

    #[test]
    fn test_custom_bounds() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = track_with_picture(temp_dir.path(), Some(png_bytes(200, 200)));

        let normalizer = CoverArtNormalizer::new(ArtworkSettings {
            max_width: 100,
            max_height: 100,
            ..ArtworkSettings::default()
        });
        let outcome = normalizer.normalize(&path).expect("normalize");
        assert_eq!(
            outcome,
            ArtworkOutcome::Resized {
                from: (200, 200),
                to: (100, 100)
            }
        );
    }
}
