//! Explicit frame loop with its own cancellation token.
//!
//! The host (a winit redraw, a headless CLI, a test) calls [`FrameLoop::advance`]
//! once per displayed frame, or hands the loop a [`FrameClock`] and lets
//! [`FrameLoop::run`] drive frames until the token is cancelled.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared stop flag. Clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How host frame time is turned into simulation updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestep {
    /// One update per frame, with the frame time capped at `max_dt`.
    Variable { max_dt: f32 },
    /// Whole `step`-sized updates from an accumulator; backlog beyond
    /// `max_substeps` per frame is dropped. A `max_substeps` of 0 runs as 1.
    Fixed { step: f32, max_substeps: u32 },
}

impl Default for Timestep {
    fn default() -> Self {
        Timestep::Variable { max_dt: 0.1 }
    }
}

/// What one host frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTick {
    /// Zero-based frame index.
    pub frame: u64,
    /// Host time since the previous frame, after sanitizing.
    pub elapsed: f32,
    /// Number of update calls made this frame.
    pub steps: u32,
    /// Seconds of fixed-step backlog discarded this frame.
    pub dropped: f32,
}

/// Source of per-frame elapsed time.
pub trait FrameClock {
    /// Seconds since the previous call.
    fn tick(&mut self) -> f32;
}

/// Deterministic clock advancing by a fixed amount per frame.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    pub frame_time: f32,
}

impl ManualClock {
    pub fn new(frame_time: f32) -> Self {
        Self { frame_time }
    }
}

impl FrameClock for ManualClock {
    fn tick(&mut self) -> f32 {
        self.frame_time
    }
}

/// Wall-clock time via [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Per-frame callbacks for [`FrameLoop::run`].
pub trait FrameHandler {
    /// One simulation update of `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Called once per frame after the updates. Break to stop the loop.
    fn render(&mut self, _tick: &FrameTick) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Frame-sequential driver: updates, then render, repeated until cancelled.
#[derive(Debug)]
pub struct FrameLoop {
    timestep: Timestep,
    token: CancellationToken,
    accumulator: f32,
    frame: u64,
}

impl FrameLoop {
    pub fn new(timestep: Timestep) -> Self {
        let timestep = match timestep {
            Timestep::Fixed { step, max_substeps } => Timestep::Fixed {
                step,
                max_substeps: max_substeps.max(1),
            },
            variable => variable,
        };
        Self {
            timestep,
            token: CancellationToken::new(),
            accumulator: 0.0,
            frame: 0,
        }
    }

    pub fn timestep(&self) -> Timestep {
        self.timestep
    }

    /// A handle that stops this loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Advance one host frame, calling `update` for each simulation step.
    pub fn advance(&mut self, elapsed: f32, mut update: impl FnMut(f32)) -> FrameTick {
        let elapsed = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            0.0
        };
        let mut tick = FrameTick {
            frame: self.frame,
            elapsed,
            ..FrameTick::default()
        };
        self.frame += 1;

        match self.timestep {
            Timestep::Fixed { step, max_substeps } if step > 0.0 => {
                self.accumulator += elapsed;
                while self.accumulator >= step && tick.steps < max_substeps {
                    update(step);
                    self.accumulator -= step;
                    tick.steps += 1;
                }
                if self.accumulator >= step {
                    let remainder = self.accumulator % step;
                    tick.dropped = self.accumulator - remainder;
                    self.accumulator = remainder;
                    tracing::debug!(dropped = tick.dropped, "fixed-step backlog dropped");
                }
            }
            Timestep::Fixed { .. } => {
                update(elapsed);
                tick.steps = 1;
            }
            Timestep::Variable { max_dt } => {
                update(elapsed.min(max_dt));
                tick.steps = 1;
            }
        }
        tick
    }

    /// Drive frames from `clock` until cancelled or `handler.render` breaks.
    /// Returns the number of frames run.
    pub fn run<C, H>(&mut self, clock: &mut C, handler: &mut H) -> u64
    where
        C: FrameClock + ?Sized,
        H: FrameHandler + ?Sized,
    {
        let _span = tracing::info_span!("frame_loop").entered();
        let start = self.frame;
        while !self.token.is_cancelled() {
            let elapsed = clock.tick();
            let tick = self.advance(elapsed, |dt| handler.update(dt));
            if handler.render(&tick).is_break() {
                break;
            }
        }
        let ran = self.frame - start;
        tracing::debug!(frames = ran, "frame loop stopped");
        ran
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(Timestep::default())
    }
}
