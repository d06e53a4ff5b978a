//! Texture registry
//!
//! Textures are owned here and addressed by [`TextureKey`]. Display names are
//! unique: loading a second texture under a taken name is rejected and the
//! existing entry is left alone.

use std::path::Path;

use serde::{Serialize, Deserialize};

use super::device::{GraphicsDevice, TextureHandle};
use crate::assets::{DecodedImage, ImageDecoder};
use crate::foundation::collections::{OrderedSlotMap, TextureKey};

/// Semantic role of a texture in the lighting model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureType {
    /// Base colour map
    Diffuse,
    /// Specular intensity map
    Specular,
}

/// Texture living on the device
#[derive(Debug, Clone)]
pub struct Texture {
    /// Device handle
    pub handle: TextureHandle,
    /// Unique display name
    pub name: String,
    /// Source file
    pub path: String,
    /// Semantic role
    pub kind: TextureType,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Name-unique texture table
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: OrderedSlotMap<TextureKey, Texture>,
}

impl TextureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` and create a texture named `name`
    pub fn load(
        &mut self,
        name: &str,
        path: &str,
        kind: TextureType,
        decoder: &dyn ImageDecoder,
        device: &mut dyn GraphicsDevice,
    ) -> Option<TextureKey> {
        if self.key_of(name).is_some() {
            log::error!("Failed to load texture {path}: name '{name}' is already taken");
            return None;
        }

        match decoder.decode(Path::new(path)) {
            Ok(image) => self.insert_image(name, path, kind, &image, device),
            Err(e) => {
                log::error!("Failed to load texture {path}: {e}");
                None
            }
        }
    }

    /// Create a texture from already decoded pixels
    pub fn insert_image(
        &mut self,
        name: &str,
        path: &str,
        kind: TextureType,
        image: &DecodedImage,
        device: &mut dyn GraphicsDevice,
    ) -> Option<TextureKey> {
        if self.key_of(name).is_some() {
            log::error!("Failed to create texture '{name}': name is already taken");
            return None;
        }

        let handle = device.create_texture(image);
        log::debug!("Created texture '{name}' ({}x{})", image.width, image.height);
        Some(self.entries.insert(Texture {
            handle,
            name: name.to_string(),
            path: path.to_string(),
            kind,
            width: image.width,
            height: image.height,
        }))
    }

    fn key_of(&self, name: &str) -> Option<TextureKey> {
        self.entries.iter().find(|(_, t)| t.name == name).map(|(key, _)| key)
    }

    /// Key of the texture named `name`
    pub fn find(&self, name: &str) -> Option<TextureKey> {
        let key = self.key_of(name);
        if key.is_none() {
            log::warn!("No texture named '{name}'");
        }
        key
    }

    /// Whether a texture named `name` exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    /// Texture for a key, `None` when stale
    pub fn get(&self, key: TextureKey) -> Option<&Texture> {
        self.entries.get(key)
    }

    /// Textures in load order
    pub fn iter(&self) -> impl Iterator<Item = (TextureKey, &Texture)> {
        self.entries.iter()
    }

    /// Number of textures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete one texture
    pub fn remove(&mut self, key: TextureKey, device: &mut dyn GraphicsDevice) -> bool {
        match self.entries.remove(key) {
            Some(texture) => {
                device.delete_texture(texture.handle);
                true
            }
            None => false,
        }
    }

    /// Delete every texture. All keys become stale.
    pub fn clear(&mut self, device: &mut dyn GraphicsDevice) {
        for texture in self.entries.drain() {
            device.delete_texture(texture.handle);
        }
    }
}
