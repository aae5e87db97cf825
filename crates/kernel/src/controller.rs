use crate::engagement::Engagement;
use crate::integrator::{MotionIntegrator, StepOutcome};
use crate::pose::ControlledPose;
use crate::state::MovementState;
use skywalk_common::MovementConfig;
use skywalk_input::{Action, InputFlags, InputTracker, Key, KeyBindings};

/// Everything the first-person simulation mutates.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    pub movement: MovementState,
    pub input: InputTracker,
    pub engagement: Engagement,
}

/// Result of one [`FirstPersonController::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Pointer not engaged; nothing was integrated.
    Paused,
    Stepped(StepOutcome),
}

/// Owns the [`SimulationState`] and routes input and frame updates into it.
#[derive(Debug, Clone, Default)]
pub struct FirstPersonController {
    state: SimulationState,
    integrator: MotionIntegrator,
}

impl FirstPersonController {
    pub fn new(config: MovementConfig) -> Self {
        Self::with_bindings(config, KeyBindings::default())
    }

    pub fn with_bindings(config: MovementConfig, bindings: KeyBindings) -> Self {
        Self {
            state: SimulationState {
                input: InputTracker::new(bindings),
                ..SimulationState::default()
            },
            integrator: MotionIntegrator::new(config),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn movement(&self) -> &MovementState {
        &self.state.movement
    }

    pub fn flags(&self) -> InputFlags {
        self.state.input.flags()
    }

    pub fn config(&self) -> &MovementConfig {
        self.integrator.config()
    }

    pub fn is_engaged(&self) -> bool {
        self.state.engagement.is_engaged()
    }

    /// Click-to-engage. Returns true if the gate opened.
    pub fn engage(&mut self) -> bool {
        let changed = self.state.engagement.engage();
        if changed {
            tracing::debug!("pointer engaged");
        }
        changed
    }

    /// External disengage signal (Escape, focus loss). Returns true if the gate closed.
    pub fn disengage(&mut self) -> bool {
        let changed = self.state.engagement.disengage();
        if changed {
            tracing::debug!("pointer disengaged, physics paused");
        }
        changed
    }

    /// Key press. Returns true if it started a jump.
    ///
    /// Flags update whether or not the pointer is engaged.
    pub fn press(&mut self, key: Key) -> bool {
        match self.state.input.key_down(key) {
            Some(Action::Jump) => self.jump(),
            _ => false,
        }
    }

    pub fn release(&mut self, key: Key) {
        self.state.input.key_up(key);
    }

    /// Key press from a platform key-code string. Unknown codes are ignored.
    pub fn on_key_down(&mut self, code: &str) -> bool {
        match self.state.input.on_key_down(code) {
            Some(Action::Jump) => self.jump(),
            _ => false,
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.state.input.on_key_up(code);
    }

    pub fn release_all(&mut self) {
        self.state.input.release_all();
    }

    fn jump(&mut self) -> bool {
        let jump_speed = self.integrator.config().jump_speed;
        let jumped = self.state.movement.try_jump(jump_speed);
        if jumped {
            tracing::debug!(jump_speed, "jump");
        }
        jumped
    }

    /// Run one frame of movement against `pose`. Skipped while disengaged.
    pub fn update<P>(&mut self, pose: &mut P, dt: f32) -> FrameOutcome
    where
        P: ControlledPose + ?Sized,
    {
        if !self.is_engaged() {
            return FrameOutcome::Paused;
        }
        let flags = self.state.input.flags();
        let outcome = self
            .integrator
            .step(&mut self.state.movement, &flags, pose, dt);
        if outcome.landed {
            tracing::debug!(height = pose.height(), "landed");
        }
        FrameOutcome::Stepped(outcome)
    }
}
