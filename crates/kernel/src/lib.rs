//! Movement Kernel: per-frame motion integration and the pointer-lock gate.
//!
//! # Invariants
//! - Vertical position never ends a step below the configured ground height.
//! - `grounded` is set exactly when a step clamps the pose onto the ground, and
//!   cleared exactly by a jump.
//! - No integration happens while the pointer is disengaged.
//! - All mutable simulation state lives in one [`SimulationState`].

pub mod controller;
pub mod engagement;
pub mod frame_loop;
pub mod integrator;
pub mod pose;
pub mod state;

pub use controller::{FirstPersonController, FrameOutcome, SimulationState};
pub use engagement::Engagement;
pub use frame_loop::{
    CancellationToken, FrameClock, FrameHandler, FrameLoop, FrameTick, ManualClock, SystemClock,
    Timestep,
};
pub use integrator::{MotionIntegrator, StepOutcome, input_direction};
pub use pose::{ControlledPose, FlatPose};
pub use state::MovementState;
