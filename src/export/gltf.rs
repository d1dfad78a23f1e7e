//! glTF/GLB export.

use crate::error::{Result, ViewerError};
use crate::scene::{Mesh, Scene, TexturedBatch};
use gltf_json as json;
use glam::{Mat4, Vec3};
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;
use std::time::Duration;

const GRID_COLOR: [f32; 4] = [0.53, 0.53, 0.53, 1.0];

/// Export a scene to GLB (binary glTF) with embedded textures.
///
/// Node 0 holds the blocks (one primitive per texture), node 1 the ground grid
/// as lines and node 2 the camera at its starting position.
pub fn export_glb(scene: &Scene) -> Result<Vec<u8>> {
    let batches = scene.batches();
    if batches.iter().all(|batch| batch.mesh.is_empty()) {
        return Err(ViewerError::Export("Cannot export empty scene".to_string()));
    }

    let mut doc = DocumentBuilder::default();

    let mut block_primitives = Vec::new();
    for batch in &batches {
        if batch.mesh.is_empty() {
            continue;
        }
        let material = doc.add_textured_material(batch)?;
        block_primitives.push(doc.add_triangles(&batch.mesh, material));
    }

    let grid_material = doc.add_flat_material(GRID_COLOR);
    let grid_lines = doc.add_lines(scene, grid_material);

    let camera = scene.camera();
    let eye = camera.position_at(Duration::ZERO);
    let view = Mat4::look_at_rh(eye, camera.target, Vec3::Y);
    let (_, rotation, _) = view.inverse().to_scale_rotation_translation();

    let root = json::Root {
        accessors: doc.accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(doc.buffer.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views: doc.buffer_views,
        images: doc.images,
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::Repeat),
            wrap_t: Valid(json::texture::WrappingMode::Repeat),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: doc.textures,
        materials: doc.materials,
        meshes: vec![create_mesh(block_primitives), create_mesh(vec![grid_lines])],
        cameras: vec![json::Camera {
            type_: Valid(json::camera::Type::Perspective),
            orthographic: None,
            perspective: Some(json::camera::Perspective {
                aspect_ratio: None,
                yfov: camera.fov_degrees.to_radians(),
                zfar: Some(camera.far),
                znear: camera.near,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        nodes: vec![
            create_node(Some(0), None, None, None),
            create_node(Some(1), None, None, None),
            create_node(None, Some(0), Some(eye.to_array()), Some(rotation.to_array())),
        ],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0), json::Index::new(1), json::Index::new(2)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ViewerError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    log::debug!(
        "GLB: {} textures, {} bytes of binary data",
        root.textures.len(),
        doc.buffer.len()
    );
    Ok(write_glb(json_string.as_bytes(), &doc.buffer))
}

/// Accumulates the binary buffer and the glTF arrays that index into it.
#[derive(Default)]
struct DocumentBuilder {
    buffer: Vec<u8>,
    buffer_views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
    images: Vec<json::Image>,
    textures: Vec<json::Texture>,
    materials: Vec<json::Material>,
}

impl DocumentBuilder {
    fn push_view(&mut self, bytes: &[u8], target: Option<json::buffer::Target>) -> u32 {
        let padding = (4 - (self.buffer.len() % 4)) % 4;
        self.buffer.extend(std::iter::repeat(0u8).take(padding));
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.buffer_views
            .push(create_buffer_view(offset, bytes.len(), target));
        self.buffer_views.len() as u32 - 1
    }

    fn push_accessor(
        &mut self,
        bytes: &[u8],
        count: usize,
        type_: json::accessor::Type,
        component_type: json::accessor::ComponentType,
        bounds: Option<([f32; 3], [f32; 3])>,
    ) -> u32 {
        let target = match component_type {
            json::accessor::ComponentType::U32 => json::buffer::Target::ElementArrayBuffer,
            _ => json::buffer::Target::ArrayBuffer,
        };
        let view = self.push_view(bytes, Some(target));
        self.accessors
            .push(create_accessor(view, count, type_, component_type, bounds));
        self.accessors.len() as u32 - 1
    }

    fn add_textured_material(&mut self, batch: &TexturedBatch) -> Result<u32> {
        let png = batch.texture.to_png()?;
        let view = self.push_view(&png, None);

        self.images.push(json::Image {
            buffer_view: Some(json::Index::new(view)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.textures.push(json::Texture {
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(self.images.len() as u32 - 1),
            extensions: Default::default(),
            extras: Default::default(),
        });

        let alpha_mode = if batch.texture.has_transparency() {
            json::material::AlphaMode::Blend
        } else {
            json::material::AlphaMode::Opaque
        };
        self.materials.push(create_material(
            alpha_mode,
            Some(self.textures.len() as u32 - 1),
            [1.0, 1.0, 1.0, 1.0],
        ));
        Ok(self.materials.len() as u32 - 1)
    }

    fn add_flat_material(&mut self, color: [f32; 4]) -> u32 {
        self.materials
            .push(create_material(json::material::AlphaMode::Opaque, None, color));
        self.materials.len() as u32 - 1
    }

    fn add_triangles(&mut self, mesh: &Mesh, material: u32) -> json::mesh::Primitive {
        use json::accessor::{ComponentType, Type};

        let count = mesh.vertex_count();
        let bounds = mesh_bounds(mesh);
        let positions = self.push_accessor(
            &f32_bytes(&mesh.positions_flat()),
            count,
            Type::Vec3,
            ComponentType::F32,
            Some(bounds),
        );
        let normals =
            self.push_accessor(&f32_bytes(&mesh.normals_flat()), count, Type::Vec3, ComponentType::F32, None);
        let uvs = self.push_accessor(&f32_bytes(&mesh.uvs_flat()), count, Type::Vec2, ComponentType::F32, None);
        let colors =
            self.push_accessor(&f32_bytes(&mesh.colors_flat()), count, Type::Vec4, ComponentType::F32, None);
        let indices = self.push_accessor(
            &u32_bytes(&mesh.indices),
            mesh.indices.len(),
            Type::Scalar,
            ComponentType::U32,
            None,
        );

        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(positions));
        attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(normals));
        attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(uvs));
        attributes.insert(Valid(json::mesh::Semantic::Colors(0)), json::Index::new(colors));

        create_primitive(attributes, Some(indices), material, json::mesh::Mode::Triangles)
    }

    fn add_lines(&mut self, scene: &Scene, material: u32) -> json::mesh::Primitive {
        let lines = scene.ground().lines();
        let points: Vec<f32> = lines
            .iter()
            .flat_map(|line| line.iter().flat_map(|p| p.to_array()))
            .collect();

        let half = scene.ground().size / 2.0;
        let center = scene.ground().center;
        let bounds = (
            (center - Vec3::new(half, 0.0, half)).to_array(),
            (center + Vec3::new(half, 0.0, half)).to_array(),
        );
        let positions = self.push_accessor(
            &f32_bytes(&points),
            lines.len() * 2,
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            Some(bounds),
        );

        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(positions));
        create_primitive(attributes, None, material, json::mesh::Mode::Lines)
    }
}

/// Assemble the GLB container.
fn write_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]);

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]);

    glb
}

fn mesh_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for vertex in &mesh.vertices {
        for i in 0..3 {
            min[i] = min[i].min(vertex.position[i]);
            max[i] = max[i].max(vertex.position[i]);
        }
    }

    (min, max)
}

fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: bounds.map(|(min, _)| json::Value::from(min.to_vec())),
        max: bounds.map(|(_, max)| json::Value::from(max.to_vec())),
        normalized: false,
        sparse: None,
    }
}

fn create_primitive(
    attributes: BTreeMap<json::validation::Checked<json::mesh::Semantic>, json::Index<json::Accessor>>,
    indices: Option<u32>,
    material: u32,
    mode: json::mesh::Mode,
) -> json::mesh::Primitive {
    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: indices.map(json::Index::new),
        material: Some(json::Index::new(material)),
        mode: Valid(mode),
        targets: None,
    }
}

fn create_mesh(primitives: Vec<json::mesh::Primitive>) -> json::Mesh {
    json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        primitives,
        weights: None,
    }
}

fn create_node(
    mesh: Option<u32>,
    camera: Option<u32>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
) -> json::Node {
    json::Node {
        camera: camera.map(json::Index::new),
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: mesh.map(json::Index::new),
        rotation: rotation.map(json::scene::UnitQuaternion),
        scale: None,
        translation,
        skin: None,
        weights: None,
    }
}

fn create_material(
    alpha_mode: json::material::AlphaMode,
    texture_idx: Option<u32>,
    base_color: [f32; 4],
) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: texture_idx.map(|index| json::texture::Info {
                index: json::Index::new(index),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor(base_color),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff: None,
        double_sided: true,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u32_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::model::ModelResolver;
    use crate::pipeline;
    use crate::schematic::{decode, fixtures::sponge_v2, BlockGrid};
    use crate::test_support::stone_assets;
    use std::sync::Arc;

    fn stone_scene(data: &[i32]) -> Scene {
        let grid = Arc::new(BlockGrid::build(
            &decode(&sponge_v2([2, 1, 1], &[("minecraft:air", 0), ("minecraft:stone", 1)], data)).unwrap(),
        ));
        let resolver = Arc::new(ModelResolver::new(stone_assets(), &ViewerConfig::default()));
        let mut scene = Scene::for_grid(&grid);
        for event in pipeline::start(grid, resolver, 1).unwrap() {
            scene.accept(event);
        }
        scene
    }

    fn json_chunk(glb: &[u8]) -> serde_json::Value {
        let len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        serde_json::from_slice(&glb[20..20 + len]).unwrap()
    }

    #[test]
    fn test_export_stone_scene() {
        let glb = export_glb(&stone_scene(&[1, 1])).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(
            u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize,
            glb.len()
        );
        assert_eq!(glb.len() % 4, 0);

        let doc = json_chunk(&glb);
        assert_eq!(doc["images"].as_array().unwrap().len(), 1);
        assert_eq!(doc["meshes"][0]["primitives"].as_array().unwrap().len(), 1);
        assert_eq!(doc["meshes"][1]["primitives"][0]["mode"], 1);
        assert_eq!(doc["cameras"][0]["type"], "perspective");
        assert_eq!(doc["nodes"].as_array().unwrap().len(), 3);

        // 2 blocks x 6 faces x 2 triangles
        let indices = doc["meshes"][0]["primitives"][0]["indices"].as_u64().unwrap() as usize;
        assert_eq!(doc["accessors"][indices]["count"], 2 * 6 * 2 * 3);
    }

    #[test]
    fn test_export_empty_scene_fails() {
        let result = export_glb(&stone_scene(&[0, 0]));
        assert!(matches!(result, Err(ViewerError::Export(_))));
    }
}
