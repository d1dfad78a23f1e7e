//! Block state to placement transform.

use crate::types::{Axis, BlockPosition, BlockProperties, Direction};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Where and how a model is placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Grid position plus any state-driven offset.
    pub translation: Vec3,
    /// Euler angles in radians, applied in XYZ order about the model centre.
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.quat(), self.translation)
    }
}

/// Compute the transform of a block from its position and state.
///
/// `half`, `facing`, `axis` and `type` each set one component independently;
/// unrecognised values leave the transform untouched.
pub fn place(position: BlockPosition, properties: &BlockProperties) -> Transform {
    let mut transform = Transform::at(position.as_vec3());
    let flipped = properties.get("half") == Some("top");

    match properties.get("half") {
        Some("top") => transform.rotation.x = PI,
        Some("bottom") => transform.rotation.x = 0.0,
        _ => {}
    }

    let sign = if flipped { -1.0 } else { 1.0 };
    match properties.get("facing").and_then(Direction::from_str) {
        Some(Direction::North) => transform.rotation.y = sign * FRAC_PI_2,
        Some(Direction::East) => transform.rotation.y = 0.0,
        Some(Direction::South) => transform.rotation.y = sign * -FRAC_PI_2,
        Some(Direction::West) => transform.rotation.y = PI,
        Some(Direction::Up | Direction::Down) | None => {}
    }

    match properties.get("axis").and_then(Axis::from_str) {
        Some(Axis::X) => transform.rotation.z = FRAC_PI_2,
        Some(Axis::Z) => transform.rotation.x = FRAC_PI_2,
        Some(Axis::Y) | None => {}
    }

    if properties.get("type") == Some("top") {
        transform.translation.y += 0.5;
    }

    transform
}
