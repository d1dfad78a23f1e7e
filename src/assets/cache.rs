//! Memoized asset fetching shared across a render pass.

use super::texture::{load_texture_from_bytes, TextureData};
use super::{AssetKind, AssetSource};
use crate::error::{AssetError, TextureError};
use crate::model::ModelDocument;
use crate::types::ResourceLocation;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

/// A thread-safe memo table.
///
/// The first caller for a key computes the value; concurrent callers for the
/// same key wait for that computation instead of repeating it. The map lock is
/// only held while looking up the slot.
pub struct Memo<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_insert_with(&self, key: &K, init: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(key.clone()).or_default().clone()
        };
        slot.get_or_init(init).clone()
    }

    /// Number of keys requested so far.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches and parses model documents and textures once per location.
pub struct AssetCache {
    source: Arc<dyn AssetSource>,
    models: Memo<ResourceLocation, Result<Arc<ModelDocument>, AssetError>>,
    textures: Memo<ResourceLocation, Result<Arc<TextureData>, TextureError>>,
}

impl AssetCache {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            models: Memo::new(),
            textures: Memo::new(),
        }
    }

    /// Get an unmerged model document.
    pub fn model(&self, location: &ResourceLocation) -> Result<Arc<ModelDocument>, AssetError> {
        self.models.get_or_insert_with(location, || {
            log::debug!("Fetching model {}", location);
            let bytes = self.source.fetch(AssetKind::Model, location)?;
            serde_json::from_slice::<ModelDocument>(&bytes)
                .map(Arc::new)
                .map_err(|e| AssetError::Parse {
                    path: AssetKind::Model.relative_path(location),
                    message: e.to_string(),
                })
        })
    }

    /// Get a decoded texture.
    pub fn texture(&self, location: &ResourceLocation) -> Result<Arc<TextureData>, TextureError> {
        self.textures.get_or_insert_with(location, || {
            log::debug!("Fetching texture {}", location);
            let bytes = self
                .source
                .fetch(AssetKind::Texture, location)
                .map_err(|source| TextureError::Fetch {
                    texture: location.clone(),
                    source,
                })?;
            load_texture_from_bytes(&bytes)
                .map(Arc::new)
                .map_err(|e| TextureError::Decode {
                    texture: location.clone(),
                    message: e.to_string(),
                })
        })
    }

    /// Number of distinct (models, textures) requested.
    pub fn counts(&self) -> (usize, usize) {
        (self.models.len(), self.textures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{png_bytes, MemorySource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memo_computes_once() {
        let memo: Memo<String, usize> = Memo::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = memo.get_or_insert_with(&"a".to_string(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                7
            });
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_memo_concurrent_callers_share_one_init() {
        let memo: Arc<Memo<u32, u32>> = Arc::new(Memo::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    memo.get_or_insert_with(&1, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        42
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_memoizes_fetches_and_failures() {
        let source = Arc::new(MemorySource::new());
        source.insert_model("block/stone", r#"{ "parent": "block/cube_all" }"#);
        source.insert_texture("block/stone", png_bytes(16, 16, [128, 128, 128, 255]));
        let cache = AssetCache::new(source.clone());

        let stone = ResourceLocation::minecraft("block/stone");
        let missing = ResourceLocation::minecraft("block/missing");
        for _ in 0..2 {
            assert!(cache.model(&stone).is_ok());
            assert!(cache.texture(&stone).is_ok());
            assert!(cache.model(&missing).is_err());
        }

        assert_eq!(source.fetch_count(), 3);
        assert_eq!(cache.counts(), (2, 1));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let source = Arc::new(MemorySource::new());
        source.insert_model("block/broken", "{ not json");
        let cache = AssetCache::new(source);

        let err = cache.model(&ResourceLocation::minecraft("block/broken")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn test_invalid_png_is_decode_error() {
        let source = Arc::new(MemorySource::new());
        source.insert_texture("block/bad", b"nope".to_vec());
        let cache = AssetCache::new(source);

        let err = cache.texture(&ResourceLocation::minecraft("block/bad")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
