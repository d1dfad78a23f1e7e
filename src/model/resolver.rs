//! Block descriptor to mesh resolution.

use super::mesh::{Cuboid, FaceMaterial, FaceTexture, ResolvedMesh, TextureIssue};
use super::{merge_documents, resolve_texture_alias, strip_namespace, ModelDocument, ModelElement, ModelFace};
use crate::assets::{AssetCache, AssetSource, Memo};
use crate::config::ViewerConfig;
use crate::error::{ResolveError, TextureError};
use crate::types::{BlockDescriptor, Direction, ResourceLocation};
use glam::Vec3;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Maximum number of parent links followed from a block model.
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Resolves blocks into meshes, memoizing documents, textures and meshes.
///
/// Shared by all workers of a render pass.
pub struct ModelResolver {
    assets: AssetCache,
    meshes: Memo<ResourceLocation, Result<Arc<ResolvedMesh>, ResolveError>>,
    tint_color: [f32; 4],
}

impl ModelResolver {
    pub fn new(source: Arc<dyn AssetSource>, config: &ViewerConfig) -> Self {
        Self {
            assets: AssetCache::new(source),
            meshes: Memo::new(),
            tint_color: config.tint_color,
        }
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Resolve a block into a mesh.
    ///
    /// Blocks sharing a model location share the same `Arc`.
    pub fn resolve(&self, block: &BlockDescriptor) -> Result<Arc<ResolvedMesh>, ResolveError> {
        let location = model_location(block);
        self.meshes
            .get_or_insert_with(&location, || self.build_mesh(&location))
    }

    /// Fetch a model and all its ancestors and fold them into one document.
    pub fn resolve_document(&self, location: &ResourceLocation) -> Result<ModelDocument, ResolveError> {
        let mut chain: Vec<Arc<ModelDocument>> = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(location.clone());

        while let Some(current) = next {
            if !visited.insert(current.clone()) {
                return Err(ResolveError::InheritanceCycle(current));
            }
            if chain.len() > MAX_INHERITANCE_DEPTH {
                return Err(ResolveError::InheritanceTooDeep(location.clone()));
            }

            let document = self
                .assets
                .model(&current)
                .map_err(|source| ResolveError::ModelFetch {
                    model: current.clone(),
                    source,
                })?;
            next = document.parent_location();
            chain.push(document);
        }

        Ok(chain
            .iter()
            .rev()
            .fold(ModelDocument::default(), |merged, document| {
                merge_documents(&merged, document)
            }))
    }

    fn build_mesh(&self, location: &ResourceLocation) -> Result<Arc<ResolvedMesh>, ResolveError> {
        let document = self.resolve_document(location)?;
        let elements = document
            .elements
            .as_ref()
            .ok_or_else(|| ResolveError::NoElements(location.clone()))?;

        let mut texture_issues = Vec::new();
        let cuboids = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                self.build_cuboid(index, element, &document.textures, &mut texture_issues)
            })
            .collect();

        for issue in &texture_issues {
            log::debug!("{}: {}", location, issue);
        }

        Ok(Arc::new(ResolvedMesh {
            model: location.clone(),
            cuboids,
            texture_issues,
        }))
    }

    fn build_cuboid(
        &self,
        index: usize,
        element: &ModelElement,
        textures: &IndexMap<String, String>,
        issues: &mut Vec<TextureIssue>,
    ) -> Cuboid {
        let from = Vec3::from(element.from) / 16.0;
        let to = Vec3::from(element.to) / 16.0;

        let faces = Direction::FACE_ORDER.map(|direction| match element.faces.get(&direction) {
            None => FaceMaterial::Blank,
            Some(face) => match self.face_texture(face, textures) {
                Ok(texture) => FaceMaterial::Textured(texture),
                Err(error) => {
                    issues.push(TextureIssue {
                        element: index,
                        face: direction,
                        reference: face.texture.clone(),
                        error,
                    });
                    FaceMaterial::Blank
                }
            },
        });

        Cuboid {
            size: to - from,
            center: (to + from) / 2.0 - Vec3::splat(0.5),
            rotation: element.rotation.clone(),
            faces,
        }
    }

    fn face_texture(
        &self,
        face: &ModelFace,
        textures: &IndexMap<String, String>,
    ) -> Result<FaceTexture, TextureError> {
        let path = resolve_texture_alias(textures, &face.texture)?;
        let location = ResourceLocation::minecraft(strip_namespace(&path));
        let texture = self.assets.texture(&location)?;
        let (uv_offset, uv_repeat) = face.uv_transform();

        Ok(FaceTexture {
            location,
            texture,
            uv_offset,
            uv_repeat,
            uv_rotation: face.rotation,
            tint: face.has_tint().then_some(self.tint_color),
        })
    }
}

/// Model location for a block: `block/<name>`, with `_inner`/`_outer` for
/// stair shapes.
pub fn model_location(block: &BlockDescriptor) -> ResourceLocation {
    let name = strip_namespace(&block.name);
    let name = name.strip_prefix("waxed_").unwrap_or(name);

    let suffix = match block.property("shape") {
        Some(shape) if shape.starts_with("inner") => "_inner",
        Some(shape) if shape.starts_with("outer") => "_outer",
        _ => "",
    };

    ResourceLocation::minecraft(format!("block/{}{}", name, suffix))
}
