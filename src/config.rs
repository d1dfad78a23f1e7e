//! Viewer configuration.

use crate::assets::{AssetSource, DirectorySource, ZipSource};
use crate::error::{Result, ViewerError};
use crate::model::tint::default_tint;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Resource pack mirror used when no asset base is configured.
pub const DEFAULT_ASSET_BASE: &str =
    "https://raw.githubusercontent.com/InventivetalentDev/minecraft-assets/1.19.2";

/// Where model documents and textures come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBase {
    /// HTTP(S) base URL.
    Remote(String),
    /// Unpacked resource pack directory.
    Directory(PathBuf),
    /// ZIP resource pack.
    Archive(PathBuf),
}

impl AssetBase {
    /// Classify a base string as URL, `.zip` archive or directory.
    pub fn parse(base: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            AssetBase::Remote(base.to_string())
        } else if base.to_ascii_lowercase().ends_with(".zip") {
            AssetBase::Archive(PathBuf::from(base))
        } else {
            AssetBase::Directory(PathBuf::from(base))
        }
    }

    /// Open the source this base points at.
    pub fn open(&self, request_timeout: Option<Duration>) -> Result<Arc<dyn AssetSource>> {
        let source: Arc<dyn AssetSource> = match self {
            AssetBase::Remote(url) => open_remote(url, request_timeout)?,
            AssetBase::Directory(path) => Arc::new(DirectorySource::new(path)?),
            AssetBase::Archive(path) => Arc::new(ZipSource::open(path)?),
        };
        log::info!("Using assets from {}", source.describe());
        Ok(source)
    }
}

impl Default for AssetBase {
    fn default() -> Self {
        AssetBase::Remote(DEFAULT_ASSET_BASE.to_string())
    }
}

impl std::fmt::Display for AssetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetBase::Remote(url) => write!(f, "{}", url),
            AssetBase::Directory(path) | AssetBase::Archive(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(feature = "http")]
fn open_remote(url: &str, timeout: Option<Duration>) -> Result<Arc<dyn AssetSource>> {
    Ok(Arc::new(crate::assets::HttpSource::new(url, timeout)?))
}

#[cfg(not(feature = "http"))]
fn open_remote(url: &str, _timeout: Option<Duration>) -> Result<Arc<dyn AssetSource>> {
    Err(ViewerError::Config(format!(
        "cannot fetch {}: built without the `http` feature",
        url
    )))
}

/// Configuration for a render pass.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Where assets are fetched from.
    pub asset_base: AssetBase,
    /// Number of resolver threads.
    pub workers: usize,
    /// Flat RGBA colour applied to faces with a `tintindex`.
    pub tint_color: [f32; 4],
    /// Per-request timeout for remote assets. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_base: AssetBase::default(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            tint_color: default_tint(),
            request_timeout: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_asset_base(mut self, base: AssetBase) -> Self {
        self.asset_base = base;
        self
    }

    /// Use at least one worker.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_tint_color(mut self, color: [f32; 4]) -> Self {
        self.tint_color = color;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Open the configured asset source.
    pub fn open_source(&self) -> Result<Arc<dyn AssetSource>> {
        if self.workers == 0 {
            return Err(ViewerError::Config("workers must be at least 1".to_string()));
        }
        self.asset_base.open(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_base() {
        assert_eq!(
            AssetBase::parse("https://example.com/pack"),
            AssetBase::Remote("https://example.com/pack".to_string())
        );
        assert_eq!(
            AssetBase::parse("packs/Faithful.ZIP"),
            AssetBase::Archive(PathBuf::from("packs/Faithful.ZIP"))
        );
        assert_eq!(
            AssetBase::parse("/opt/assets"),
            AssetBase::Directory(PathBuf::from("/opt/assets"))
        );
    }

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.asset_base.to_string(), DEFAULT_ASSET_BASE);
        assert!(config.workers >= 1);
        assert!((config.tint_color[1] - 0.8).abs() < 1e-4);
        assert_eq!(config.tint_color, default_tint());
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_workers(0)
            .with_tint_color([1.0, 0.0, 0.0, 1.0])
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.workers, 1);
        assert_eq!(config.tint_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_open_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::default()
            .with_asset_base(AssetBase::Directory(dir.path().to_path_buf()));
        let source = config.open_source().unwrap();
        assert!(source.describe().contains("directory"));
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let config = ViewerConfig::default()
            .with_asset_base(AssetBase::Directory(PathBuf::from("/no/such/assets")));
        assert!(matches!(config.open_source(), Err(ViewerError::Config(_))));
    }
}
