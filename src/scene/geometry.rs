//! Triangle geometry generated from placed cuboids.

use crate::model::{Cuboid, FaceTexture};
use crate::placement::Transform;
use crate::types::Direction;
use glam::{Vec2, Vec3};

/// A vertex in the output mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Vertex color (RGBA).
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a quad (two triangles) by vertex indices.
    /// Vertices go clockwise as seen from the front; triangles are wound CCW.
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.add_triangle(i0, i2, i1);
        self.add_triangle(i0, i3, i2);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Positions as a flat array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }

    pub fn colors_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.color).collect()
    }

    /// Append one textured cuboid face, placed with `transform`.
    pub fn add_face(
        &mut self,
        cuboid: &Cuboid,
        direction: Direction,
        face: &FaceTexture,
        transform: &Transform,
    ) {
        let matrix = transform.matrix();
        let rotation = transform.quat();
        let color = face.tint.unwrap_or([1.0, 1.0, 1.0, 1.0]);

        let mut normal = Vec3::from(direction.normal());
        if let Some(element_rotation) = &cuboid.rotation {
            normal = element_rotation.apply_normal(normal);
        }
        let normal = (rotation * normal).normalize_or_zero().to_array();

        let uvs = face_uvs(face);
        let corners = face_corners(cuboid.min(), cuboid.max(), direction);
        let mut indices = [0u32; 4];
        for (i, corner) in corners.into_iter().enumerate() {
            let local = match &cuboid.rotation {
                Some(element_rotation) => element_rotation.apply(corner),
                None => corner,
            };
            let position = matrix.transform_point3(local).to_array();
            indices[i] =
                self.add_vertex(Vertex::new(position, normal, uvs[i].to_array()).with_color(color));
        }
        self.add_quad(indices[0], indices[1], indices[2], indices[3]);
    }
}

/// Corners of a face in the order top-left, top-right, bottom-right,
/// bottom-left as seen from outside, matching texture orientation.
pub fn face_corners(min: Vec3, max: Vec3, direction: Direction) -> [Vec3; 4] {
    let (m, n) = (min, max);
    match direction {
        Direction::North => [
            Vec3::new(n.x, n.y, m.z),
            Vec3::new(m.x, n.y, m.z),
            Vec3::new(m.x, m.y, m.z),
            Vec3::new(n.x, m.y, m.z),
        ],
        Direction::South => [
            Vec3::new(m.x, n.y, n.z),
            Vec3::new(n.x, n.y, n.z),
            Vec3::new(n.x, m.y, n.z),
            Vec3::new(m.x, m.y, n.z),
        ],
        Direction::East => [
            Vec3::new(n.x, n.y, n.z),
            Vec3::new(n.x, n.y, m.z),
            Vec3::new(n.x, m.y, m.z),
            Vec3::new(n.x, m.y, n.z),
        ],
        Direction::West => [
            Vec3::new(m.x, n.y, m.z),
            Vec3::new(m.x, n.y, n.z),
            Vec3::new(m.x, m.y, n.z),
            Vec3::new(m.x, m.y, m.z),
        ],
        // Texture top faces north.
        Direction::Up => [
            Vec3::new(m.x, n.y, m.z),
            Vec3::new(n.x, n.y, m.z),
            Vec3::new(n.x, n.y, n.z),
            Vec3::new(m.x, n.y, n.z),
        ],
        // Texture top faces south.
        Direction::Down => [
            Vec3::new(m.x, m.y, n.z),
            Vec3::new(n.x, m.y, n.z),
            Vec3::new(n.x, m.y, m.z),
            Vec3::new(m.x, m.y, m.z),
        ],
    }
}

/// UVs for the four face corners after crop and clockwise rotation.
pub fn face_uvs(face: &FaceTexture) -> [Vec2; 4] {
    const CORNERS: [Vec2; 4] = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let offset = Vec2::from(face.uv_offset);
    let repeat = Vec2::from(face.uv_repeat);
    let steps = (face.uv_rotation.rem_euclid(360) / 90) as usize;

    std::array::from_fn(|i| offset + CORNERS[(i + 4 - steps) % 4] * repeat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureData;
    use crate::model::FaceMaterial;
    use crate::types::ResourceLocation;
    use std::sync::Arc;

    fn face(uv_rotation: i32) -> FaceTexture {
        FaceTexture {
            location: ResourceLocation::minecraft("block/stone"),
            texture: Arc::new(TextureData::blank()),
            uv_offset: [0.0, 0.5],
            uv_repeat: [1.0, 0.5],
            uv_rotation,
            tint: None,
        }
    }

    fn unit_cube() -> Cuboid {
        Cuboid {
            size: Vec3::ONE,
            center: Vec3::ZERO,
            rotation: None,
            faces: std::array::from_fn(|_| FaceMaterial::Blank),
        }
    }

    #[test]
    fn test_mesh_quad() {
        let mut mesh = Mesh::new();

        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]));
        let v3 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));

        mesh.add_quad(v0, v1, v2, v3);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_face_corners_lie_on_face_plane() {
        let (min, max) = (Vec3::splat(-0.5), Vec3::splat(0.5));
        for direction in Direction::FACE_ORDER {
            let normal = Vec3::from(direction.normal());
            for corner in face_corners(min, max, direction) {
                assert_eq!(corner.dot(normal), 0.5, "{}", direction);
            }
        }
    }

    #[test]
    fn test_face_winding_points_outward() {
        let (min, max) = (Vec3::splat(-0.5), Vec3::splat(0.5));
        for direction in Direction::FACE_ORDER {
            let [a, b, c, _] = face_corners(min, max, direction);
            // First emitted triangle is (0, 2, 1).
            let winding = (c - a).cross(b - a);
            assert!(winding.dot(Vec3::from(direction.normal())) > 0.0, "{}", direction);
        }
    }

    #[test]
    fn test_face_uvs_crop_and_rotate() {
        let uvs = face_uvs(&face(0));
        assert_eq!(uvs[0], Vec2::new(0.0, 0.5));
        assert_eq!(uvs[2], Vec2::new(1.0, 1.0));

        let rotated = face_uvs(&face(90));
        assert_eq!(rotated[0], Vec2::new(0.0, 1.0));
        assert_eq!(rotated[1], Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_add_face_applies_transform_and_tint() {
        let mut textured = face(0);
        textured.tint = Some([0.0, 1.0, 0.0, 1.0]);
        let transform = Transform::at(Vec3::new(3.0, 0.0, 0.0));

        let mut mesh = Mesh::new();
        mesh.add_face(&unit_cube(), Direction::Up, &textured, &transform);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.position[1], 0.5);
            assert!(vertex.position[0] == 2.5 || vertex.position[0] == 3.5);
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
            assert_eq!(vertex.color, [0.0, 1.0, 0.0, 1.0]);
        }
    }
}
