//! wgpu render backend for the skywalk viewer.
//!
//! Draws a procedural gradient sky and an infinite checkered ground plane.
//! The camera is a pointer-lock first-person camera that the movement kernel
//! drives through [`skywalk_kernel::ControlledPose`].
//!
//! # Invariants
//! - Renderer never mutates simulation state.
//! - The ground quad is recentred on the camera every frame, so it never ends.
//! - Pitch never reaches ±90°, so the view basis stays well defined.

mod camera;
mod gpu;
mod shaders;

pub use camera::PointerLockCamera;
pub use gpu::WgpuRenderer;
