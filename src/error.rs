//! Error types for the schematic viewer.
//!
//! Only [`ViewerError`] aborts a render pass. [`AssetError`], [`ResolveError`]
//! and [`TextureError`] describe per-asset, per-block and per-face failures:
//! they are cloned into memo caches and collected into the end-of-pass report.

use crate::types::ResourceLocation;
use thiserror::Error;

/// Result type alias using ViewerError.
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Main error type for schematic viewing operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The schematic container could not be decompressed or does not match the
    /// expected tag layout.
    #[error("Format error: {0}")]
    Format(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// An asset could not be fetched.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// A block could not be resolved to a model.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Invalid configuration (unsupported asset base, missing feature).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to export the scene.
    #[error("Export error: {0}")]
    Export(String),
}

impl ViewerError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ViewerError::Format(message.into())
    }
}

/// Failure to retrieve or parse a single asset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    /// The asset does not exist at the source.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The transport failed (HTTP status, connection, archive read).
    #[error("failed to fetch {path}: {message}")]
    Transport { path: String, message: String },

    /// The location does not name a path inside the pack.
    #[error("invalid asset path: {0}")]
    InvalidPath(String),

    /// The asset was retrieved but its contents are invalid.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Why a block produced no model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// A document in the model chain could not be fetched or parsed.
    #[error("model {model} unavailable: {source}")]
    ModelFetch {
        model: ResourceLocation,
        #[source]
        source: AssetError,
    },

    /// The parent chain revisits a model.
    #[error("model inheritance cycle at {0}")]
    InheritanceCycle(ResourceLocation),

    /// The parent chain is longer than the inheritance limit.
    #[error("model inheritance too deep (possible circular reference): {0}")]
    InheritanceTooDeep(ResourceLocation),

    /// The merged model declares no elements.
    #[error("model {0} has no elements")]
    NoElements(ResourceLocation),
}

/// Why a face fell back to the blank material.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextureError {
    /// The texture asset could not be fetched.
    #[error("texture {texture} unavailable: {source}")]
    Fetch {
        texture: ResourceLocation,
        #[source]
        source: AssetError,
    },

    /// The texture was fetched but is not a decodable image.
    #[error("texture {texture} could not be decoded: {message}")]
    Decode {
        texture: ResourceLocation,
        message: String,
    },

    /// A `#` reference chain returns to a key it already visited.
    #[error("texture alias cycle through #{0}")]
    AliasCycle(String),

    /// A `#` reference names a key the model does not bind.
    #[error("texture alias #{0} is not bound")]
    UnboundAlias(String),
}
