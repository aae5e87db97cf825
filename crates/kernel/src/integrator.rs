use crate::pose::ControlledPose;
use crate::state::MovementState;
use glam::Vec2;
use skywalk_common::MovementConfig;
use skywalk_input::InputFlags;

/// Normalized lateral input direction.
///
/// `x` is `right - left`, `y` is `forward - backward`. Zero when no direction
/// (or only opposing directions) is held; otherwise unit length, so diagonal
/// input is no faster than axis-aligned input.
pub fn input_direction(flags: &InputFlags) -> Vec2 {
    let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
    Vec2::new(
        axis(flags.right, flags.left),
        axis(flags.forward, flags.backward),
    )
    .normalize_or_zero()
}

/// What a single integration step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step clamped a previously airborne pose onto the ground.
    pub landed: bool,
    /// The step clamped the pose to ground height at all.
    pub clamped: bool,
}

/// Frame-rate independent Euler integration of the viewer's velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionIntegrator {
    config: MovementConfig,
}

impl MotionIntegrator {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Base speed, doubled (by `sprint_multiplier`) while sprinting.
    pub fn effective_speed(&self, flags: &InputFlags) -> f32 {
        if flags.sprint {
            self.config.base_speed * self.config.sprint_multiplier
        } else {
            self.config.base_speed
        }
    }

    /// Negative or non-finite frame times become 0. Long frames are the
    /// host's to pace; see [`crate::Timestep`].
    pub fn sanitize_dt(dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        dt
    }

    /// Advance `state` and `pose` by `dt` seconds.
    ///
    /// Acceleration is additive with no explicit cap; damping is what bounds
    /// lateral speed (at `effective_speed / damping`).
    pub fn step<P>(
        &self,
        state: &mut MovementState,
        flags: &InputFlags,
        pose: &mut P,
        dt: f32,
    ) -> StepOutcome
    where
        P: ControlledPose + ?Sized,
    {
        let cfg = &self.config;
        let dt = Self::sanitize_dt(dt);
        let v = &mut state.velocity;

        // Linear-in-dt friction; the factor is capped so it cannot flip a sign.
        let decay = (cfg.damping * dt).clamp(0.0, 1.0);
        v.x -= v.x * decay;
        v.z -= v.z * decay;

        v.y -= cfg.gravity * dt;

        let speed = self.effective_speed(flags);
        let dir = input_direction(flags);
        if flags.forward || flags.backward {
            v.z -= dir.y * speed * dt;
        }
        if flags.left || flags.right {
            v.x -= dir.x * speed * dt;
        }

        // The move primitives use the opposite sign convention to velocity.
        pose.move_right(-v.x * dt);
        pose.move_forward(-v.z * dt);
        pose.set_height(pose.height() + v.y * dt);

        let mut outcome = StepOutcome::default();
        if pose.height() < cfg.ground_height {
            v.y = 0.0;
            pose.set_height(cfg.ground_height);
            outcome.clamped = true;
            outcome.landed = !state.grounded;
            state.grounded = true;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::FlatPose;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn flags() -> InputFlags {
        InputFlags::default()
    }

    #[test]
    fn direction_is_zero_without_input() {
        assert_eq!(input_direction(&flags()), Vec2::ZERO);
        let sprint_only = InputFlags {
            sprint: true,
            ..flags()
        };
        assert_eq!(input_direction(&sprint_only), Vec2::ZERO);
    }

    #[test]
    fn opposing_keys_cancel() {
        let f = InputFlags {
            forward: true,
            backward: true,
            ..flags()
        };
        assert_eq!(input_direction(&f), Vec2::ZERO);
    }

    #[test]
    fn diagonal_direction_is_unit_length() {
        let f = InputFlags {
            forward: true,
            right: true,
            ..flags()
        };
        let d = input_direction(&f);
        assert!((d.length() - 1.0).abs() < 1e-6, "got {}", d.length());
        assert!((d.x - d.y).abs() < 1e-6);
    }

    #[test]
    fn effective_speed_doubles_when_sprinting() {
        let i = MotionIntegrator::default();
        assert_eq!(i.effective_speed(&flags()), 50.0);
        let f = InputFlags {
            sprint: true,
            ..flags()
        };
        assert_eq!(i.effective_speed(&f), 100.0);
    }

    #[test]
    fn sanitize_dt_rejects_bad_values() {
        assert_eq!(MotionIntegrator::sanitize_dt(-1.0), 0.0);
        assert_eq!(MotionIntegrator::sanitize_dt(f32::NAN), 0.0);
        assert_eq!(MotionIntegrator::sanitize_dt(f32::INFINITY), 0.0);
        assert_eq!(MotionIntegrator::sanitize_dt(5.0), 5.0);
        assert_eq!(MotionIntegrator::sanitize_dt(DT), DT);
    }

    #[test]
    fn long_step_integrates_the_full_interval() {
        let i = MotionIntegrator::default();
        let mut state = MovementState {
            velocity: Vec3::new(0.0, 12.0, 0.0),
            grounded: false,
        };
        let mut pose = FlatPose::default();
        i.step(&mut state, &flags(), &mut pose, 0.25);
        assert_eq!(state.velocity.y, 4.5);
        assert!((pose.position.y - 3.125).abs() < 1e-6);
    }

    #[test]
    fn single_step_matches_hand_computation() {
        let i = MotionIntegrator::default();
        let mut state = MovementState {
            velocity: Vec3::new(1.0, 0.0, -2.0),
            grounded: false,
        };
        let mut pose = FlatPose::new(Vec3::new(0.0, 10.0, 0.0), 0.0);
        let dt = 0.01;
        let f = InputFlags {
            forward: true,
            ..flags()
        };
        i.step(&mut state, &f, &mut pose, dt);

        // damping: 1.0 - 1.0*0.1 = 0.9 ; -2.0 + 0.2 = -1.8, then -= 1*50*0.01
        assert!((state.velocity.x - 0.9).abs() < 1e-6);
        assert!((state.velocity.z - (-2.3)).abs() < 1e-6);
        assert!((state.velocity.y - (-0.3)).abs() < 1e-6);
        assert!((pose.position.y - (10.0 - 0.003)).abs() < 1e-5);
        // yaw 0: forward is +X, right is +Z
        assert!((pose.position.x - 0.023).abs() < 1e-6);
        assert!((pose.position.z - (-0.009)).abs() < 1e-6);
    }

    #[test]
    fn ground_clamp_sets_grounded_and_zeroes_vertical() {
        let i = MotionIntegrator::default();
        let mut state = MovementState {
            velocity: Vec3::new(0.0, -20.0, 0.0),
            grounded: false,
        };
        let mut pose = FlatPose::new(Vec3::new(0.0, 2.1, 0.0), 0.0);
        let outcome = i.step(&mut state, &flags(), &mut pose, DT);
        assert!(outcome.landed);
        assert!(outcome.clamped);
        assert!(state.grounded);
        assert_eq!(state.velocity.y, 0.0);
        assert_eq!(pose.position.y, 2.0);
    }

    #[test]
    fn resting_on_ground_reclamps_without_landing() {
        let i = MotionIntegrator::default();
        let mut state = MovementState::default();
        let mut pose = FlatPose::default();
        let outcome = i.step(&mut state, &flags(), &mut pose, DT);
        assert!(outcome.clamped);
        assert!(!outcome.landed);
        assert!(state.grounded);
        assert_eq!(pose.position.y, 2.0);
        assert_eq!(state.velocity.y, 0.0);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let i = MotionIntegrator::default();
        let mut state = MovementState {
            velocity: Vec3::new(3.0, 5.0, -1.0),
            grounded: false,
        };
        let mut pose = FlatPose::new(Vec3::new(1.0, 4.0, 1.0), 0.3);
        let before = (state, pose);
        i.step(&mut state, &flags(), &mut pose, 0.0);
        assert_eq!((state, pose), before);
    }

    #[test]
    fn huge_dt_never_reverses_lateral_velocity() {
        let i = MotionIntegrator::default();
        let mut state = MovementState {
            velocity: Vec3::new(4.0, 0.0, -7.0),
            grounded: true,
        };
        let mut pose = FlatPose::default();
        i.step(&mut state, &flags(), &mut pose, 10.0);
        assert!(state.velocity.x >= 0.0);
        assert!(state.velocity.z <= 0.0);
    }

    #[test]
    fn high_damping_config_cannot_overshoot() {
        let i = MotionIntegrator::new(MovementConfig {
            damping: 500.0,
            ..MovementConfig::default()
        });
        let mut state = MovementState {
            velocity: Vec3::new(-4.0, 0.0, 2.0),
            grounded: true,
        };
        let mut pose = FlatPose::default();
        i.step(&mut state, &flags(), &mut pose, DT);
        assert_eq!(state.velocity.x, 0.0);
        assert_eq!(state.velocity.z, 0.0);
    }

    #[test]
    fn works_through_trait_object() {
        let i = MotionIntegrator::default();
        let mut state = MovementState::default();
        let mut pose = FlatPose::default();
        let dyn_pose: &mut dyn ControlledPose = &mut pose;
        let f = InputFlags {
            right: true,
            ..flags()
        };
        i.step(&mut state, &f, dyn_pose, DT);
        assert!(pose.position.z > 0.0, "strafing right moves along +Z at yaw 0");
    }
}
