//! Asset sources backed by the local filesystem, ZIP archives and memory.

use super::{AssetKind, AssetSource};
use crate::error::{AssetError, Result, ViewerError};
use crate::types::ResourceLocation;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Assets read from an unpacked resource pack directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ViewerError::Config(format!(
                "asset directory {} does not exist",
                root.display()
            )));
        }
        if !root.join("assets").is_dir() {
            log::warn!("{} has no assets directory, lookups will fail", root.display());
        }
        Ok(Self { root })
    }
}

impl AssetSource for DirectorySource {
    fn fetch(&self, kind: AssetKind, location: &ResourceLocation) -> std::result::Result<Vec<u8>, AssetError> {
        let relative = kind.checked_path(location)?;
        let path = self.root.join(&relative);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(relative),
            _ => AssetError::Transport {
                path: relative,
                message: e.to_string(),
            },
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Assets read from a ZIP resource pack, loaded into memory up front.
pub struct ZipSource {
    name: String,
    entries: HashMap<String, Vec<u8>>,
}

impl ZipSource {
    /// Load a resource pack from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut source = Self::from_bytes(&data)?;
        source.name = path.display().to_string();
        Ok(source)
    }

    /// Load a resource pack from bytes (ZIP data).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)?;
        let mut entries = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let Some(key) = asset_key(file.name()).map(str::to_string) else {
                continue;
            };
            if !(key.ends_with(".json") || key.ends_with(".png")) {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            entries.insert(key, contents);
        }

        log::info!("Loaded {} asset entries from archive", entries.len());
        Ok(Self {
            name: "in-memory archive".to_string(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetSource for ZipSource {
    fn fetch(&self, kind: AssetKind, location: &ResourceLocation) -> std::result::Result<Vec<u8>, AssetError> {
        let relative = kind.relative_path(location);
        self.entries
            .get(&relative)
            .cloned()
            .ok_or(AssetError::NotFound(relative))
    }

    fn describe(&self) -> String {
        format!("archive {}", self.name)
    }
}

/// Strip anything before the `assets/` component of an archive path, so packs
/// wrapped in a top-level folder resolve the same as flat ones.
fn asset_key(file_path: &str) -> Option<&str> {
    if file_path.starts_with("assets/") {
        return Some(file_path);
    }
    file_path
        .find("/assets/")
        .map(|index| &file_path[index + 1..])
}

/// In-memory assets, keyed by their resource pack path.
#[derive(Default)]
pub struct MemorySource {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kind: AssetKind, location: &ResourceLocation, data: Vec<u8>) {
        self.entries.lock().insert(kind.relative_path(location), data);
    }

    /// Add a model document in the `minecraft` namespace.
    pub fn insert_model(&self, path: &str, json: &str) {
        self.insert(
            AssetKind::Model,
            &ResourceLocation::minecraft(path),
            json.as_bytes().to_vec(),
        );
    }

    /// Add a texture in the `minecraft` namespace.
    pub fn insert_texture(&self, path: &str, png: Vec<u8>) {
        self.insert(AssetKind::Texture, &ResourceLocation::minecraft(path), png);
    }

    /// Number of fetches served or refused so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, kind: AssetKind, location: &ResourceLocation) -> std::result::Result<Vec<u8>, AssetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let relative = kind.relative_path(location);
        self.entries
            .lock()
            .get(&relative)
            .cloned()
            .ok_or(AssetError::NotFound(relative))
    }

    fn describe(&self) -> String {
        format!("memory ({} entries)", self.entries.lock().len())
    }
}
