//! Block model documents and their resolution into meshes.
//!
//! Models describe geometry as cuboid elements in 0-16 block space. A model may
//! name a `parent` whose fields it inherits; textures are either paths or
//! `#key` aliases into the merged `textures` map.

pub mod mesh;
pub mod resolver;
pub mod tint;

pub use mesh::{Cuboid, FaceMaterial, FaceTexture, ResolvedMesh, TextureIssue};
pub use resolver::{ModelResolver, MAX_INHERITANCE_DEPTH};

use crate::error::TextureError;
use crate::types::{Direction, ElementRotation, ResourceLocation};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A parsed model from `models/*.json`, before parent merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Whether to use ambient occlusion.
    #[serde(default, rename = "ambientocclusion")]
    pub ambient_occlusion: Option<bool>,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: IndexMap<String, String>,

    /// Model elements (cuboids).
    #[serde(default)]
    pub elements: Option<Vec<ModelElement>>,

    /// Display transforms by context.
    #[serde(default)]
    pub display: Option<serde_json::Value>,
}

impl ModelDocument {
    /// Location of the parent document, `None` for roots and `builtin/*` parents.
    pub fn parent_location(&self) -> Option<ResourceLocation> {
        let parent = strip_namespace(self.parent.as_deref()?);
        if parent.starts_with("builtin/") {
            return None;
        }
        Some(ResourceLocation::minecraft(parent))
    }
}

/// A cuboid element within a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    #[serde(default)]
    pub rotation: Option<ElementRotation>,
    #[serde(default)]
    pub faces: HashMap<Direction, ModelFace>,
}

/// A face of a model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFace {
    /// UV coordinates [u1, v1, u2, v2] in 0-16 range.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    pub texture: String,
    #[serde(default)]
    pub cullface: Option<Direction>,
    /// UV rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub tintindex: Option<i32>,
}

impl ModelFace {
    /// UV offset and repeat in texture space (0-1).
    pub fn uv_transform(&self) -> ([f32; 2], [f32; 2]) {
        match self.uv {
            Some([u0, v0, u1, v1]) => (
                [u0 / 16.0, v0 / 16.0],
                [(u1 - u0) / 16.0, (v1 - v0) / 16.0],
            ),
            None => ([0.0, 0.0], [1.0, 1.0]),
        }
    }

    pub fn has_tint(&self) -> bool {
        self.tintindex.is_some()
    }
}

/// Merge a child document over its already merged parent.
///
/// Textures and display contexts merge per key with the child winning;
/// elements and ambient occlusion come from the child when it defines them.
pub fn merge_documents(parent: &ModelDocument, child: &ModelDocument) -> ModelDocument {
    let mut merged = parent.clone();

    for (key, value) in &child.textures {
        merged.textures.insert(key.clone(), value.clone());
    }

    if child.elements.is_some() {
        merged.elements = child.elements.clone();
    }

    if child.ambient_occlusion.is_some() {
        merged.ambient_occlusion = child.ambient_occlusion;
    }

    merged.display = match (&parent.display, &child.display) {
        (Some(serde_json::Value::Object(parent_obj)), Some(serde_json::Value::Object(child_obj))) => {
            let mut display = parent_obj.clone();
            for (key, value) in child_obj {
                display.insert(key.clone(), value.clone());
            }
            Some(serde_json::Value::Object(display))
        }
        (_, Some(child_display)) => Some(child_display.clone()),
        (parent_display, None) => parent_display.clone(),
    };

    merged.parent = None;
    merged
}

/// Follow `#key` references to a texture path.
///
/// Non-alias references are returned unchanged.
pub fn resolve_texture_alias(
    textures: &IndexMap<String, String>,
    reference: &str,
) -> Result<String, TextureError> {
    let mut visited = HashSet::new();
    let mut current = reference;

    while let Some(key) = current.strip_prefix('#') {
        if !visited.insert(key) {
            return Err(TextureError::AliasCycle(key.to_string()));
        }
        current = textures
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TextureError::UnboundAlias(key.to_string()))?;
    }

    Ok(current.to_string())
}

/// Drop a `namespace:` prefix.
pub(crate) fn strip_namespace(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, path)| path)
}
