use glam::{Mat4, Vec3};
use skywalk_common::{CameraConfig, Viewport};
use skywalk_kernel::ControlledPose;
use skywalk_kernel::pose::horizontal_basis;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// First-person camera: mouse-look orientation plus a projection.
///
/// Translation is driven by the movement kernel; rotation by mouse deltas
/// while the pointer is locked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerLockCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

impl Default for PointerLockCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), Viewport::default())
    }
}

impl PointerLockCamera {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: config.fov_degrees.to_radians(),
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            sensitivity: config.sensitivity,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Look direction including pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        horizontal_basis(self.yaw).1
    }

    /// Apply a mouse delta in pixels. Moving right turns right, moving up looks up.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw = (self.yaw + dx * self.sensitivity).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Maps clip space back to world space; the sky pass uses it to recover
    /// view rays.
    pub fn inverse_view_projection(&self) -> Mat4 {
        self.view_projection().inverse()
    }
}

impl ControlledPose for PointerLockCamera {
    fn move_forward(&mut self, distance: f32) {
        self.position += horizontal_basis(self.yaw).0 * distance;
    }

    fn move_right(&mut self, distance: f32) {
        self.position += horizontal_basis(self.yaw).1 * distance;
    }

    fn height(&self) -> f32 {
        self.position.y
    }

    fn set_height(&mut self, y: f32) {
        self.position.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).length() < eps
    }

    #[test]
    fn default_camera() {
        let cam = PointerLockCamera::default();
        assert_eq!(cam.position.y, 2.0);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = PointerLockCamera::default();
        cam.rotate(0.0, -1.0e6);
        assert!((cam.pitch - PITCH_LIMIT).abs() < 1e-6);
        cam.rotate(0.0, 1.0e6);
        assert!((cam.pitch + PITCH_LIMIT).abs() < 1e-6);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn mouse_right_turns_toward_right_vector() {
        let mut cam = PointerLockCamera::default();
        let right = cam.right();
        cam.rotate(100.0, 0.0);
        assert!(cam.forward().dot(right) > 0.0);
    }

    #[test]
    fn forward_motion_ignores_pitch() {
        let mut cam = PointerLockCamera::default();
        cam.pitch = 1.2;
        cam.move_forward(3.0);
        assert!(close(cam.position, Vec3::new(3.0, 2.0, 0.0), 1e-5));
        cam.move_right(-1.0);
        assert!(close(cam.position, Vec3::new(3.0, 2.0, -1.0), 1e-5));
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut cam = PointerLockCamera::default();
        cam.set_viewport(Viewport::new(800, 800));
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn inverse_round_trips_a_point() {
        let mut cam = PointerLockCamera::default().with_position(Vec3::new(5.0, 3.0, -2.0));
        cam.rotate(120.0, 40.0);
        let p = cam.position + cam.forward() * 10.0;
        let clip = cam.view_projection() * p.extend(1.0);
        let back = cam.inverse_view_projection() * clip;
        let back = back.truncate() / back.w;
        assert!(close(back, p, 1e-2), "{back:?}");
        // Centre of the screen at the far plane lies along the look direction.
        let far = cam.inverse_view_projection() * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (far.truncate() / far.w - cam.position).normalize();
        assert!(close(dir, cam.forward(), 1e-3));
    }

    #[test]
    fn drives_the_kernel_integrator() {
        use skywalk_kernel::FirstPersonController;
        let mut controller = FirstPersonController::default();
        controller.engage();
        controller.on_key_down("KeyD");
        let mut cam = PointerLockCamera::default();
        for _ in 0..10 {
            controller.update(&mut cam, 1.0 / 60.0);
        }
        assert!(cam.position.z > 0.0);
        assert_eq!(cam.position.y, 2.0);
    }
}
