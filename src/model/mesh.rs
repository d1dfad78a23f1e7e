//! Resolved, renderable block meshes.

use crate::assets::TextureData;
use crate::error::TextureError;
use crate::types::{Direction, ElementRotation, ResourceLocation};
use glam::Vec3;
use std::sync::Arc;

/// A textured face.
#[derive(Debug, Clone)]
pub struct FaceTexture {
    /// Texture asset location.
    pub location: ResourceLocation,
    pub texture: Arc<TextureData>,
    /// Top-left corner of the UV crop, in 0-1 texture space.
    pub uv_offset: [f32; 2],
    /// Extent of the UV crop, in 0-1 texture space.
    pub uv_repeat: [f32; 2],
    /// Clockwise UV rotation in degrees.
    pub uv_rotation: i32,
    pub tint: Option<[f32; 4]>,
}

/// Material of one cuboid face.
#[derive(Debug, Clone)]
pub enum FaceMaterial {
    /// Not drawn: the face is absent or its texture failed to resolve.
    Blank,
    Textured(FaceTexture),
}

impl FaceMaterial {
    pub fn texture(&self) -> Option<&FaceTexture> {
        match self {
            FaceMaterial::Blank => None,
            FaceMaterial::Textured(texture) => Some(texture),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, FaceMaterial::Blank)
    }
}

/// One element of a model, in block space centred on the origin.
#[derive(Debug, Clone)]
pub struct Cuboid {
    /// Extent in blocks.
    pub size: Vec3,
    /// Centre relative to the block centre.
    pub center: Vec3,
    pub rotation: Option<ElementRotation>,
    /// Materials in [`Direction::FACE_ORDER`].
    pub faces: [FaceMaterial; 6],
}

impl Cuboid {
    pub fn face(&self, direction: Direction) -> &FaceMaterial {
        &self.faces[direction.face_index()]
    }

    /// Minimum corner relative to the block centre.
    pub fn min(&self) -> Vec3 {
        self.center - self.size / 2.0
    }

    /// Maximum corner relative to the block centre.
    pub fn max(&self) -> Vec3 {
        self.center + self.size / 2.0
    }
}

/// A face that fell back to [`FaceMaterial::Blank`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextureIssue {
    /// Index of the element in the model.
    pub element: usize,
    pub face: Direction,
    /// The face's texture reference as written in the model.
    pub reference: String,
    pub error: TextureError,
}

impl std::fmt::Display for TextureIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "element {} {} face ({}): {}",
            self.element, self.face, self.reference, self.error
        )
    }
}

/// A block model ready to place.
#[derive(Debug, Clone)]
pub struct ResolvedMesh {
    /// Model the mesh was built from.
    pub model: ResourceLocation,
    pub cuboids: Vec<Cuboid>,
    pub texture_issues: Vec<TextureIssue>,
}

impl ResolvedMesh {
    pub fn textured_faces(&self) -> impl Iterator<Item = (&Cuboid, Direction, &FaceTexture)> + '_ {
        self.cuboids.iter().flat_map(|cuboid| {
            Direction::FACE_ORDER
                .iter()
                .filter_map(move |&direction| cuboid.face(direction).texture().map(|t| (cuboid, direction, t)))
        })
    }
}
