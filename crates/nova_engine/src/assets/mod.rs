//! Asset loading
//!
//! File-format decoders feeding the render registries. Image decoding goes through
//! the [`ImageDecoder`] seam; Wavefront OBJ geometry is parsed in-crate.

pub mod image_loader;
pub mod obj_loader;

pub use image_loader::{DecodedImage, ImageCrateDecoder, ImageDecoder};
pub use obj_loader::ObjLoader;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image could not be decoded
    #[error("Failed to decode image {path}: {message}")]
    Decode {
        /// Source path
        path: String,
        /// Decoder message
        message: String,
    },

    /// Malformed text asset
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Structurally invalid asset
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// `builtin:` path naming no known primitive
    #[error("Unknown built-in primitive: {0}")]
    UnknownBuiltin(String),
}
