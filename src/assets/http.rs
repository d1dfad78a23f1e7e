//! Assets fetched over HTTP(S) from a resource pack mirror.

use super::{AssetKind, AssetSource};
use crate::error::{AssetError, Result, ViewerError};
use crate::types::ResourceLocation;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Fetches `<base>/assets/<namespace>/...` with a blocking client.
///
/// Worker threads each block on their own request, so a slow asset only
/// delays the blocks that need it.
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ViewerError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }
}

impl AssetSource for HttpSource {
    fn fetch(&self, kind: AssetKind, location: &ResourceLocation) -> std::result::Result<Vec<u8>, AssetError> {
        let relative = kind.checked_path(location)?;
        let url = self.url_for(&relative);
        log::debug!("GET {}", url);

        let transport = |message: String| AssetError::Transport {
            path: relative.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AssetError::NotFound(relative.clone())),
            status if !status.is_success() => Err(transport(format!("HTTP {}", status))),
            _ => response
                .bytes()
                .map(|bytes| bytes.to_vec())
                .map_err(|e| transport(e.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_layout() {
        let source = HttpSource::new("https://example.com/assets-mirror/1.19.2/", None).unwrap();
        assert_eq!(source.base_url(), "https://example.com/assets-mirror/1.19.2");

        let relative = AssetKind::Model.relative_path(&ResourceLocation::minecraft("block/stone"));
        assert_eq!(
            source.url_for(&relative),
            "https://example.com/assets-mirror/1.19.2/assets/minecraft/models/block/stone.json"
        );
    }
}
