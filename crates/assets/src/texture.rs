use std::path::Path;

use crate::AssetError;

/// Decoded RGBA8 image, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Decode PNG or JPEG bytes.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self, AssetError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            name: name.into(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::decode(path.display().to_string(), &bytes)
    }

    /// A 1x1 texture of a single colour.
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    /// Bytes per row of pixel data.
    pub fn row_bytes(&self) -> u32 {
        self.width * 4
    }
}
