//! Wall-clock frame timing.

use web_time::Instant;

/// Timing for one frame, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Time since the previous frame.
    pub dt: f32,
    /// Time since the first frame.
    pub t: f32,
}

impl FrameTime {
    pub fn new(dt: f32, t: f32) -> Self {
        Self { dt, t }
    }
}

/// Produces [`FrameTime`]s from a monotonic clock.
#[derive(Clone, Debug)]
pub struct FrameClock {
    first: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start the clock now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            first: now,
            last: now,
        }
    }

    /// Advance to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        let t = now.saturating_duration_since(self.first).as_secs_f32();
        self.last = now;
        FrameTime { dt, t }
    }
}

/// Fixed-step frame times, for headless runs and tests.
#[derive(Clone, Debug)]
pub struct FixedStep {
    dt: f32,
    frames: u32,
}

impl FixedStep {
    /// Frames of `1 / hz` seconds.
    pub fn new(hz: f32) -> Self {
        Self {
            dt: 1.0 / hz,
            frames: 0,
        }
    }

    /// Step length in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Advance one step.
    #[allow(clippy::cast_precision_loss)]
    pub fn tick(&mut self) -> FrameTime {
        self.frames += 1;
        FrameTime {
            dt: self.dt,
            t: self.frames as f32 * self.dt,
        }
    }
}
