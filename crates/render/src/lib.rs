//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read a [`FrameView`] snapshot and never mutate simulation state.
//! - A frame view is captured after the frame's updates, so it shows the
//!   state the next displayed image should reflect.

mod renderer;

pub use renderer::{DebugTextRenderer, FrameView, Renderer};
