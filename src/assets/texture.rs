//! Texture decoding.

use crate::error::{Result, ViewerError};

/// Decoded RGBA8 texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Whether the image is a vertical strip of animation frames.
    pub is_animated: bool,
    /// Animation frame count (1 if not animated).
    pub frame_count: u32,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            is_animated: false,
            frame_count: 1,
        }
    }

    /// A 1x1 fully transparent texture.
    pub fn blank() -> Self {
        Self::new(1, 1, vec![0, 0, 0, 0])
    }

    /// Check if this texture has transparency.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks(4).any(|pixel| pixel[3] < 255)
    }

    /// Get the first frame of an animated texture (or the whole texture if not animated).
    pub fn first_frame(&self) -> TextureData {
        if !self.is_animated || self.frame_count <= 1 {
            return self.clone();
        }

        let frame_height = self.height / self.frame_count;
        let frame_size = (self.width * frame_height * 4) as usize;

        Self::new(self.width, frame_height, self.pixels[..frame_size].to_vec())
    }

    /// Encode the first frame as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let frame = self.first_frame();
        let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.pixels)
            .ok_or_else(|| ViewerError::Export("texture pixel buffer has the wrong size".to_string()))?;
        let mut bytes = Vec::new();
        image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Load a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> std::result::Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    // Animated textures are stacked square frames
    let is_animated = width > 0 && height > width && height % width == 0;
    let frame_count = if is_animated { height / width } else { 1 };

    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
        is_animated,
        frame_count,
    })
}
