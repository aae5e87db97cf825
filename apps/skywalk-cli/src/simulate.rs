//! Headless fixed-step run of the movement controller over a [`FlatPose`].

use glam::Vec3;
use serde::Serialize;
use skywalk_common::MovementConfig;
use skywalk_input::Key;
use skywalk_kernel::{
    FirstPersonController, FlatPose, FrameHandler, FrameLoop, FrameTick, ManualClock, Timestep,
};
use skywalk_render::{DebugTextRenderer, FrameView, Renderer};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::ops::ControlFlow;

/// Scripted input for a run.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// Pressed before frame 0.
    pub hold: Vec<Key>,
    /// Frames at which Space is tapped.
    pub jump_at: BTreeSet<u64>,
    /// Frame at which every held key is released.
    pub release_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Final state after a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub frames: u64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
}

pub struct Simulation<W> {
    controller: FirstPersonController,
    pose: FlatPose,
    schedule: Schedule,
    frames: u64,
    format: Format,
    out: W,
    error: Option<io::Error>,
    written: u64,
}

impl<W: Write> Simulation<W> {
    pub fn new(
        config: MovementConfig,
        yaw_degrees: f32,
        schedule: Schedule,
        frames: u64,
        format: Format,
        out: W,
    ) -> Self {
        let mut controller = FirstPersonController::new(config);
        controller.engage();
        let pose = FlatPose::new(
            Vec3::new(0.0, config.ground_height, 0.0),
            yaw_degrees.to_radians(),
        );
        Self {
            controller,
            pose,
            schedule,
            frames,
            format,
            out,
            error: None,
            written: 0,
        }
    }

    fn apply_inputs(&mut self, frame: u64) {
        if frame == 0 {
            for &key in &self.schedule.hold {
                self.controller.press(key);
            }
        }
        if self.schedule.release_at == Some(frame) {
            for &key in &self.schedule.hold {
                self.controller.release(key);
            }
        }
        if self.schedule.jump_at.contains(&frame) {
            if self.controller.press(Key::Space) {
                tracing::debug!(frame, "scheduled jump");
            } else {
                tracing::debug!(frame, "scheduled jump ignored while airborne");
            }
            self.controller.release(Key::Space);
        }
    }

    fn write_frame(&mut self, view: &FrameView) -> io::Result<()> {
        match self.format {
            Format::Text => writeln!(self.out, "{}", DebugTextRenderer.render(view)),
            Format::Json => {
                serde_json::to_writer(&mut self.out, view)?;
                writeln!(self.out)
            }
        }
    }

    fn summary(&self) -> Summary {
        let movement = self.controller.movement();
        Summary {
            frames: self.written,
            position: self.pose.position,
            velocity: movement.velocity,
            grounded: movement.grounded,
        }
    }

    /// Run every frame at `dt` seconds, one integration step per frame.
    pub fn run(mut self, dt: f32) -> io::Result<(Summary, W)> {
        if self.frames > 0 {
            self.apply_inputs(0);
            let mut frame_loop = FrameLoop::new(Timestep::Fixed {
                step: dt,
                max_substeps: 1,
            });
            frame_loop.run(&mut ManualClock::new(dt), &mut self);
        }
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok((self.summary(), self.out))
    }
}

impl<W: Write> FrameHandler for Simulation<W> {
    fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.pose, dt);
    }

    fn render(&mut self, tick: &FrameTick) -> ControlFlow<()> {
        let view = FrameView::capture(
            tick.frame,
            &self.controller,
            self.pose.position,
            self.pose.yaw,
            0.0,
        );
        if let Err(e) = self.write_frame(&view) {
            self.error = Some(e);
            return ControlFlow::Break(());
        }
        self.written += 1;

        let next = tick.frame + 1;
        if next >= self.frames {
            return ControlFlow::Break(());
        }
        self.apply_inputs(next);
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run(schedule: Schedule, frames: u64, format: Format) -> (Summary, String) {
        let sim = Simulation::new(
            MovementConfig::default(),
            0.0,
            schedule,
            frames,
            format,
            Vec::new(),
        );
        let (summary, out) = sim.run(DT).expect("in-memory writes succeed");
        (summary, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn zero_frames_prints_nothing() {
        let (summary, out) = run(Schedule::default(), 0, Format::Text);
        assert!(out.is_empty());
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn one_line_per_frame() {
        let (summary, out) = run(Schedule::default(), 25, Format::Text);
        assert_eq!(out.lines().count(), 25);
        assert_eq!(summary.frames, 25);
        assert!(out.lines().all(|l| l.contains("grounded")));
    }

    #[test]
    fn held_forward_moves_along_yaw() {
        let schedule = Schedule {
            hold: vec![Key::KeyW, Key::ShiftLeft],
            ..Schedule::default()
        };
        let (summary, _) = run(schedule, 60, Format::Text);
        assert!(summary.position.x > 3.0);
        assert!(summary.position.z.abs() < 1e-5);
        assert!((summary.velocity.z + 10.0).abs() < 0.01);
    }

    #[test]
    fn release_decays_velocity() {
        let schedule = Schedule {
            hold: vec![Key::KeyD],
            release_at: Some(30),
            ..Schedule::default()
        };
        let (summary, _) = run(schedule, 120, Format::Text);
        assert!(summary.velocity.x.abs() < 1e-3);
        assert!(summary.velocity.x <= 0.0);
    }

    #[test]
    fn json_lines_report_jump() {
        let schedule = Schedule {
            jump_at: [0, 3].into_iter().collect(),
            ..Schedule::default()
        };
        let (_, out) = run(schedule, 5, Format::Json);
        let frames: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid json"))
            .collect();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0]["frame"], 0);
        assert_eq!(frames[0]["grounded"], false);
        let vy0 = frames[0]["velocity"][1].as_f64().expect("number");
        assert!((vy0 - 11.5).abs() < 1e-4);
        // second tap at frame 3 is airborne and ignored
        let vy3 = frames[3]["velocity"][1].as_f64().expect("number");
        assert!(vy3 < vy0);
    }

    #[test]
    fn jump_lands_within_run() {
        let schedule = Schedule {
            jump_at: [10].into_iter().collect(),
            ..Schedule::default()
        };
        let (summary, out) = run(schedule, 120, Format::Text);
        assert!(out.lines().nth(10).is_some_and(|l| l.contains("airborne")));
        assert!(summary.grounded);
        assert_eq!(summary.position.y, 2.0);
    }

    #[test]
    fn long_frames_integrate_their_full_dt() {
        let schedule = Schedule {
            jump_at: [0].into_iter().collect(),
            ..Schedule::default()
        };
        let sim = Simulation::new(
            MovementConfig::default(),
            0.0,
            schedule,
            1,
            Format::Text,
            Vec::new(),
        );
        let (summary, _) = sim.run(0.25).expect("in-memory writes succeed");
        // 12 - 30 * 0.25
        assert_eq!(summary.velocity.y, 4.5);
        assert!((summary.position.y - 3.125).abs() < 1e-6);
    }
}
