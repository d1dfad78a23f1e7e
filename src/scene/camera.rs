//! Orbit camera and ground grid parameters.

use glam::Vec3;
use std::time::Duration;

/// Milliseconds per radian of orbit.
const ORBIT_PERIOD_MS: f32 = 1250.0;

/// A perspective camera circling the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Position before any orbiting.
    pub initial_position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Horizontal radius of the orbit.
    pub distance: f32,
    pub auto_rotate: bool,
}

impl OrbitCamera {
    pub fn for_structure(width: usize, height: usize, length: usize) -> Self {
        let (w, h, l) = (width as f32, height as f32, length as f32);
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            initial_position: Vec3::new(0.0, h + h / 3.0, 10.0),
            target: Vec3::new(w / 2.0, 0.0, l / 2.0),
            distance: w.max(h).max(l) * 1.5,
            auto_rotate: true,
        }
    }

    /// Camera position after `elapsed` time on the orbit clock.
    ///
    /// The height stays at the initial height; x and z circle the target.
    pub fn position_at(&self, elapsed: Duration) -> Vec3 {
        if !self.auto_rotate {
            return self.initial_position;
        }
        let angle = elapsed.as_millis() as f32 / ORBIT_PERIOD_MS;
        Vec3::new(
            self.target.x + angle.cos() * self.distance,
            self.initial_position.y,
            self.target.z + angle.sin() * self.distance,
        )
    }
}

/// Reference grid under the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundGrid {
    /// Side length in blocks.
    pub size: f32,
    pub divisions: u32,
    pub center: Vec3,
}

impl GroundGrid {
    pub fn for_structure(width: usize, length: usize) -> Self {
        let size = width.max(length);
        Self {
            size: size as f32,
            divisions: size as u32,
            center: Vec3::new(width as f32 / 2.0 - 0.5, -0.5, length as f32 / 2.0 - 0.5),
        }
    }

    /// Line segments of the grid as pairs of endpoints.
    pub fn lines(&self) -> Vec<[Vec3; 2]> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions.max(1) as f32;
        let mut lines = Vec::with_capacity((self.divisions as usize + 1) * 2);

        for i in 0..=self.divisions {
            let offset = -half + i as f32 * step;
            lines.push([
                self.center + Vec3::new(offset, 0.0, -half),
                self.center + Vec3::new(offset, 0.0, half),
            ]);
            lines.push([
                self.center + Vec3::new(-half, 0.0, offset),
                self.center + Vec3::new(half, 0.0, offset),
            ]);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_for_structure() {
        let camera = OrbitCamera::for_structure(4, 6, 2);
        assert_eq!(camera.initial_position, Vec3::new(0.0, 8.0, 10.0));
        assert_eq!(camera.target, Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(camera.distance, 9.0);
        assert_eq!((camera.fov_degrees, camera.near, camera.far), (75.0, 0.1, 1000.0));
        assert!(camera.auto_rotate);
    }

    #[test]
    fn test_orbit_position() {
        let camera = OrbitCamera::for_structure(4, 6, 2);
        assert!(camera
            .position_at(Duration::ZERO)
            .abs_diff_eq(Vec3::new(11.0, 8.0, 1.0), 1e-5));

        let quarter = Duration::from_secs_f64(1.25 * std::f64::consts::FRAC_PI_2);
        assert!(camera
            .position_at(quarter)
            .abs_diff_eq(Vec3::new(2.0, 8.0, 10.0), 1e-2));

        let fixed = OrbitCamera {
            auto_rotate: false,
            ..camera
        };
        assert_eq!(fixed.position_at(quarter), fixed.initial_position);
    }

    #[test]
    fn test_ground_grid() {
        let grid = GroundGrid::for_structure(3, 5);
        assert_eq!(grid.size, 5.0);
        assert_eq!(grid.divisions, 5);
        assert_eq!(grid.center, Vec3::new(1.0, -0.5, 2.0));

        let lines = grid.lines();
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().flatten().all(|p| p.y == -0.5));
    }
}
