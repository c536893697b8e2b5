//! Fixed-rate clock for physics ticks.
//!
//! Frame deltas are poured into an accumulator; every whole `timestep` in it
//! is one fixed tick. At most `max_steps_per_frame` ticks run per frame and
//! any backlog beyond that is dropped, so a long stall does not snowball.

use bevy_ecs::prelude::Resource;
use log::warn;

#[derive(Resource, Clone, Copy, Debug)]
pub struct FixedTime {
    /// Seconds per fixed tick.
    pub timestep: f32,
    pub max_steps_per_frame: u32,
    accumulator: f32,
    /// Fixed-clock time at the start of the current tick.
    pub elapsed: f32,
    pub tick_count: u64,
}

impl Default for FixedTime {
    fn default() -> Self {
        Self::new(0.02)
    }
}

impl FixedTime {
    pub fn new(timestep: f32) -> Self {
        Self {
            timestep: if timestep > 0.0 { timestep } else { 0.02 },
            max_steps_per_frame: 8,
            accumulator: 0.0,
            elapsed: 0.0,
            tick_count: 0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps_per_frame = max_steps.max(1);
        self
    }

    /// Add a scaled frame delta and return how many ticks are due.
    pub fn accumulate(&mut self, delta: f32) -> u32 {
        self.accumulator += delta.max(0.0);
        let due = (self.accumulator / self.timestep).floor();
        let max = self.max_steps_per_frame as f32;
        if due > max {
            warn!(
                "Fixed clock is {} ticks behind, dropping {} of them",
                due,
                due - max
            );
            self.accumulator = self.accumulator.rem_euclid(self.timestep);
            return self.max_steps_per_frame;
        }
        self.accumulator -= due * self.timestep;
        due as u32
    }

    /// Mark one tick as run.
    pub fn advance(&mut self) {
        self.elapsed += self.timestep;
        self.tick_count += 1;
    }

    /// Fraction of a tick left in the accumulator.
    pub fn overstep(&self) -> f32 {
        self.accumulator / self.timestep
    }
}
