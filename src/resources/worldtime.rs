//! Simulation time and the injectable clock.
//!
//! Every timestamp stored on a character is a [`Millis`] value read from a
//! [`Clock`]. In the ECS world the clock is the [`WorldTime`] resource; tests
//! drive the pure update functions with a [`FakeClock`] instead.

use bevy_ecs::prelude::Resource;
use std::cell::Cell;

/// Milliseconds since simulation start.
pub type Millis = u64;

/// Source of the current simulation time.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled seconds since start.
    pub elapsed: f32,
    /// Scaled seconds of the last step.
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
    /// Scaled milliseconds since start, accumulated without float drift.
    pub elapsed_ms: Millis,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
            elapsed_ms: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}

impl Clock for WorldTime {
    fn now_ms(&self) -> Millis {
        self.elapsed_ms
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Millis>,
}

impl FakeClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
