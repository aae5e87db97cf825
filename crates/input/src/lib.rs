//! Input State Tracker: platform key codes mapped to movement intent.
//!
//! # Invariants
//! - Raw key events only ever touch [`InputFlags`]; the integrator reads them once per frame.
//! - Jump is an edge: one [`Action::Jump`] per press transition, never while held.
//! - Unrecognized key codes are a no-op.

pub mod action;
pub mod bindings;
pub mod key;
pub mod tracker;

pub use action::Action;
pub use bindings::KeyBindings;
pub use key::Key;
pub use tracker::{InputFlags, InputTracker};
