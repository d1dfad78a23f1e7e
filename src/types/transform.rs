//! Element-level rotation from model documents.

use super::Axis;
use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Element-level rotation from model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRotation {
    /// Origin point for rotation (in 0-16 Minecraft coordinates).
    #[serde(default = "default_origin")]
    pub origin: [f32; 3],
    /// Axis to rotate around.
    pub axis: Axis,
    /// Rotation angle in degrees (-45 to 45, in 22.5 increments).
    pub angle: f32,
    /// Whether to rescale the element after rotation.
    #[serde(default)]
    pub rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl ElementRotation {
    /// Convert origin from Minecraft coordinates (0-16) to block-centered (-0.5 to 0.5).
    pub fn normalized_origin(&self) -> Vec3 {
        Vec3::from(self.origin) / 16.0 - Vec3::splat(0.5)
    }

    /// Get the angle in radians.
    pub fn angle_radians(&self) -> f32 {
        self.angle.to_radians()
    }

    /// Get the rescale factor for this rotation.
    /// When rescale is true, the element is scaled to maintain its original size.
    pub fn rescale_factor(&self) -> f32 {
        if self.rescale {
            1.0 / self.angle_radians().cos()
        } else {
            1.0
        }
    }

    /// Rotate a block-centered point about the origin, rescaling the two
    /// off-axis components when requested.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        let origin = self.normalized_origin();
        let angle = self.angle_radians();
        let rescale = self.rescale_factor();

        let (matrix, scale) = match self.axis {
            Axis::X => (Mat3::from_rotation_x(angle), Vec3::new(1.0, rescale, rescale)),
            Axis::Y => (Mat3::from_rotation_y(angle), Vec3::new(rescale, 1.0, rescale)),
            Axis::Z => (Mat3::from_rotation_z(angle), Vec3::new(rescale, rescale, 1.0)),
        };

        matrix * (point - origin) * scale + origin
    }

    /// Rotate a direction vector (no rescale, no origin).
    pub fn apply_normal(&self, normal: Vec3) -> Vec3 {
        let angle = self.angle_radians();
        let matrix = match self.axis {
            Axis::X => Mat3::from_rotation_x(angle),
            Axis::Y => Mat3::from_rotation_y(angle),
            Axis::Z => Mat3::from_rotation_z(angle),
        };
        matrix * normal
    }
}
