//! Image decoding seam

use std::path::Path;

use super::AssetError;

/// Tightly packed 8-bit pixels, rows bottom-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// 1, 3 or 4
    pub channels: u8,
    /// `width * height * channels` bytes
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Solid-colour RGBA image, for tests and placeholder textures
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = (width * height) as usize;
        Self {
            width,
            height,
            channels: 4,
            pixels: rgba.iter().copied().cycle().take(count * 4).collect(),
        }
    }
}

/// Turns an image file into pixels
pub trait ImageDecoder {
    /// Decode the file at `path`
    fn decode(&self, path: &Path) -> Result<DecodedImage, AssetError>;
}

/// Default decoder backed by the `image` crate
#[derive(Debug, Clone)]
pub struct ImageCrateDecoder {
    flip_vertically: bool,
}

impl Default for ImageCrateDecoder {
    fn default() -> Self {
        Self { flip_vertically: true }
    }
}

impl ImageCrateDecoder {
    /// Decoder that keeps the file's top-down row order
    pub fn without_flip() -> Self {
        Self { flip_vertically: false }
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, AssetError> {
        let mut img = image::open(path).map_err(|e| AssetError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // GL samples textures with the origin at the bottom-left
        if self.flip_vertically {
            img = img.flipv();
        }

        let (width, height) = (img.width(), img.height());
        let (channels, pixels) = match img.color().channel_count() {
            1 => (1, img.into_luma8().into_raw()),
            4 => (4, img.into_rgba8().into_raw()),
            _ => (3, img.into_rgb8().into_raw()),
        };

        log::debug!("Decoded {} ({}x{}, {} channels)", path.display(), width, height, channels);

        Ok(DecodedImage { width, height, channels, pixels })
    }
}
