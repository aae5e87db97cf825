use glam::Vec3;
use serde::Serialize;
use skywalk_input::InputFlags;
use skywalk_kernel::FirstPersonController;

/// Read-only snapshot of one displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameView {
    pub frame: u64,
    /// Camera position in world space.
    pub position: Vec3,
    /// Radians; 0 looks along +X.
    pub yaw: f32,
    pub pitch: f32,
    pub velocity: Vec3,
    pub grounded: bool,
    pub engaged: bool,
    pub flags: InputFlags,
}

impl FrameView {
    /// Snapshot the controller alongside the camera pose it drives.
    pub fn capture(
        frame: u64,
        controller: &FirstPersonController,
        position: Vec3,
        yaw: f32,
        pitch: f32,
    ) -> Self {
        let movement = controller.movement();
        Self {
            frame,
            position,
            yaw,
            pitch,
            velocity: movement.velocity,
            grounded: movement.grounded,
            engaged: controller.is_engaged(),
            flags: controller.flags(),
        }
    }

    pub fn lateral_speed(&self) -> f32 {
        glam::Vec2::new(self.velocity.x, self.velocity.z).length()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given snapshot.
    fn render(&self, view: &FrameView) -> Self::Output;
}

/// One-line text rendering of a frame, for the CLI and logs.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn held(flags: &InputFlags) -> String {
    let mut s = String::with_capacity(5);
    for (on, c) in [
        (flags.forward, 'W'),
        (flags.left, 'A'),
        (flags.backward, 'S'),
        (flags.right, 'D'),
        (flags.sprint, '^'),
    ] {
        s.push(if on { c } else { '-' });
    }
    s
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &FrameView) -> String {
        let mut out = String::new();
        let p = view.position;
        let v = view.velocity;
        out.push_str(&format!(
            "[{:>5}] pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) yaw={:.1} {} {} keys={}",
            view.frame,
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z,
            view.yaw.to_degrees(),
            if view.grounded { "grounded" } else { "airborne" },
            if view.engaged { "engaged" } else { "paused" },
            held(&view.flags),
        ));
        out
    }
}
