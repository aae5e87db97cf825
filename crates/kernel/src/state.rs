use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Velocity and ground contact of the viewer.
///
/// `velocity.x` and `velocity.z` are lateral (in the pose's local frame),
/// `velocity.y` is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    pub velocity: Vec3,
    /// "Can jump": the pose rests at ground height.
    pub grounded: bool,
}

impl Default for MovementState {
    /// At rest on the ground.
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            grounded: true,
        }
    }
}

impl MovementState {
    /// Airborne with no velocity, e.g. when spawning above the ground.
    pub fn airborne() -> Self {
        Self {
            velocity: Vec3::ZERO,
            grounded: false,
        }
    }

    /// Length of the lateral (x, z) velocity.
    pub fn lateral_speed(&self) -> f32 {
        glam::Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    /// Start a jump if grounded. A press while airborne is dropped.
    pub fn try_jump(&mut self, jump_speed: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = jump_speed;
        self.grounded = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_grounded_at_rest() {
        let s = MovementState::default();
        assert!(s.grounded);
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn jump_sets_velocity_and_clears_grounded() {
        let mut s = MovementState::default();
        assert!(s.try_jump(12.0));
        assert_eq!(s.velocity.y, 12.0);
        assert!(!s.grounded);
    }

    #[test]
    fn jump_while_airborne_is_dropped() {
        let mut s = MovementState::airborne();
        s.velocity.y = -3.0;
        assert!(!s.try_jump(12.0));
        assert_eq!(s.velocity.y, -3.0);
    }

    #[test]
    fn lateral_speed_ignores_vertical() {
        let s = MovementState {
            velocity: Vec3::new(3.0, 100.0, 4.0),
            grounded: false,
        };
        assert_eq!(s.lateral_speed(), 5.0);
    }
}
