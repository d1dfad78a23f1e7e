//! Scene assembly from placement events.
//!
//! A [`Scene`] is owned by one thread and grows append-only as events arrive.
//! It carries no renderer state, only what a renderer or exporter needs.

pub mod camera;
pub mod geometry;

pub use camera::{GroundGrid, OrbitCamera};
pub use geometry::{Mesh, Vertex};

use crate::assets::TextureData;
use crate::pipeline::{PlacementEvent, RenderReport, SceneEvent};
use crate::schematic::BlockGrid;
use crate::types::{BoundingBox, ResourceLocation};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Geometry sharing one texture.
#[derive(Debug, Clone)]
pub struct TexturedBatch {
    pub location: ResourceLocation,
    pub texture: Arc<TextureData>,
    pub mesh: Mesh,
}

/// Placed models plus camera and ground grid for one structure.
#[derive(Debug, Clone)]
pub struct Scene {
    width: usize,
    height: usize,
    length: usize,
    models: Vec<PlacementEvent>,
    report: RenderReport,
    ground: GroundGrid,
    camera: OrbitCamera,
}

impl Scene {
    pub fn new(width: usize, height: usize, length: usize) -> Self {
        Self {
            width,
            height,
            length,
            models: Vec::new(),
            report: RenderReport::default(),
            ground: GroundGrid::for_structure(width, length),
            camera: OrbitCamera::for_structure(width, height, length),
        }
    }

    /// Empty scene sized for `grid`, carrying its palette diagnostics.
    pub fn for_grid(grid: &BlockGrid) -> Self {
        let mut scene = Self::new(grid.width(), grid.height(), grid.length());
        scene.report.palette_misses = grid.palette_misses().clone();
        scene
    }

    pub fn accept(&mut self, event: SceneEvent) {
        self.report.record(&event);
        if let SceneEvent::Placed(placement) = event {
            self.models.push(placement);
        }
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.length)
    }

    /// Placed models in arrival order.
    pub fn models(&self) -> &[PlacementEvent] {
        &self.models
    }

    pub fn report(&self) -> &RenderReport {
        &self.report
    }

    pub fn ground(&self) -> &GroundGrid {
        &self.ground
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Triangle geometry of all textured faces, one batch per texture.
    ///
    /// Batches are ordered by texture location so output is stable regardless
    /// of event arrival order.
    pub fn batches(&self) -> Vec<TexturedBatch> {
        let mut batches: BTreeMap<ResourceLocation, TexturedBatch> = BTreeMap::new();

        for placement in &self.models {
            for (cuboid, direction, face) in placement.mesh.textured_faces() {
                let batch = batches
                    .entry(face.location.clone())
                    .or_insert_with(|| TexturedBatch {
                        location: face.location.clone(),
                        texture: Arc::clone(&face.texture),
                        mesh: Mesh::new(),
                    });
                batch.mesh.add_face(cuboid, direction, face, &placement.transform);
            }
        }

        batches.into_values().collect()
    }

    /// Bounds of all generated geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let batches = self.batches();
        BoundingBox::from_points(
            batches
                .iter()
                .flat_map(|batch| batch.mesh.vertices.iter().map(|v| v.position)),
        )
    }
}
