//! Asset sources for model documents and textures.
//!
//! Assets follow the resource pack layout
//! `<base>/assets/<namespace>/models/<path>.json` and
//! `<base>/assets/<namespace>/textures/<path>.png`, where the base is a URL,
//! a directory or a ZIP archive.

pub mod cache;
#[cfg(feature = "http")]
pub mod http;
pub mod local;
pub mod texture;

pub use cache::{AssetCache, Memo};
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use local::{DirectorySource, MemorySource, ZipSource};
pub use texture::TextureData;

use crate::error::AssetError;
use crate::types::ResourceLocation;
use std::path::{Component, Path};

/// Kind of asset requested from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Model,
    Texture,
}

impl AssetKind {
    /// Relative path of an asset inside a resource pack.
    pub fn relative_path(&self, location: &ResourceLocation) -> String {
        match self {
            AssetKind::Model => format!("assets/{}/models/{}.json", location.namespace, location.path),
            AssetKind::Texture => {
                format!("assets/{}/textures/{}.png", location.namespace, location.path)
            }
        }
    }

    /// [`relative_path`](Self::relative_path), rejecting locations that would
    /// leave the pack root (`..`, absolute or prefixed components).
    pub fn checked_path(&self, location: &ResourceLocation) -> Result<String, AssetError> {
        let relative = self.relative_path(location);
        let escapes = Path::new(&relative)
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
            || relative.contains('\\');
        if escapes {
            return Err(AssetError::InvalidPath(relative));
        }
        Ok(relative)
    }
}

/// Something that can return the raw bytes of an asset.
///
/// Sources are shared by all resolver threads of a render pass.
pub trait AssetSource: Send + Sync {
    /// Fetch the bytes of an asset.
    fn fetch(&self, kind: AssetKind, location: &ResourceLocation) -> Result<Vec<u8>, AssetError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
