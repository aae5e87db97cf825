use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The seam between the integrator and whatever owns the camera pose.
///
/// Lateral motion goes through the orientation-aware `move_*` primitives;
/// vertical position is read and written directly.
pub trait ControlledPose {
    /// Translate along the horizontal look direction.
    fn move_forward(&mut self, distance: f32);
    /// Translate along the horizontal right vector.
    fn move_right(&mut self, distance: f32);
    fn height(&self) -> f32;
    fn set_height(&mut self, y: f32);
}

/// Horizontal forward and right unit vectors for a yaw angle (radians).
///
/// Yaw 0 looks down +X; right is `forward × up`.
pub fn horizontal_basis(yaw: f32) -> (Vec3, Vec3) {
    let forward = Vec3::new(yaw.cos(), 0.0, yaw.sin());
    let right = forward.cross(Vec3::Y);
    (forward, right)
}

/// Position plus heading, with no projection. Used headless and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatPose {
    pub position: Vec3,
    pub yaw: f32,
}

impl FlatPose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

impl Default for FlatPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 0.0), 0.0)
    }
}

impl ControlledPose for FlatPose {
    fn move_forward(&mut self, distance: f32) {
        let (forward, _) = horizontal_basis(self.yaw);
        self.position += forward * distance;
    }

    fn move_right(&mut self, distance: f32) {
        let (_, right) = horizontal_basis(self.yaw);
        self.position += right * distance;
    }

    fn height(&self) -> f32 {
        self.position.y
    }

    fn set_height(&mut self, y: f32) {
        self.position.y = y;
    }
}
