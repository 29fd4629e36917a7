use serde::{Deserialize, Serialize};

/// Length of one physics step at 60 Hz.
pub const FRAME_MS: f32 = 1000.0 / 60.0;

/// Upper bound on catch-up steps in a single update.
pub const MAX_STEPS: u32 = 8;

/// Fixed-step accumulator for per-frame physics.
///
/// Velocities in the physics games are expressed in pixels per 60 Hz
/// frame; feeding real deltas through this keeps movement independent of
/// the caller's frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta_ms` and return how many whole steps to run.
    ///
    /// Time beyond `MAX_STEPS` is dropped rather than carried, so a long
    /// stall never turns into a burst on the following frames.
    pub fn advance(&mut self, delta_ms: f32) -> u32 {
        if !(delta_ms > 0.0) || !delta_ms.is_finite() {
            return 0;
        }
        self.accumulator += delta_ms;
        let mut steps = 0;
        while self.accumulator >= FRAME_MS && steps < MAX_STEPS {
            self.accumulator -= FRAME_MS;
            steps += 1;
        }
        if steps == MAX_STEPS {
            self.accumulator = self.accumulator.min(FRAME_MS - f32::EPSILON).max(0.0);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Whole-second countdown driven by update deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    seconds_left: u32,
    accumulator_ms: f32,
    halted: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds_left: seconds,
            accumulator_ms: 0.0,
            halted: false,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consume `delta_ms`, decrementing once per full second crossed.
    ///
    /// Returns `true` on the call that brings the counter to zero and
    /// `false` on every other call, including all calls after `halt()`.
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        if self.halted || self.seconds_left == 0 || !(delta_ms > 0.0) {
            return false;
        }
        self.accumulator_ms += delta_ms;
        while self.accumulator_ms >= 1000.0 && self.seconds_left > 0 {
            self.accumulator_ms -= 1000.0;
            self.seconds_left -= 1;
        }
        self.seconds_left == 0
    }

    /// Stop permanently.
    pub fn halt(&mut self) {
        self.halted = true;
    }
}

/// Simulation clock in milliseconds, advanced only by update deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta_ms: f32) {
        if delta_ms > 0.0 && delta_ms.is_finite() {
            self.now_ms += f64::from(delta_ms);
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn now_secs(&self) -> f64 {
        self.now_ms / 1000.0
    }

    pub fn since(&self, earlier_ms: f64) -> f64 {
        (self.now_ms - earlier_ms).max(0.0)
    }
}
