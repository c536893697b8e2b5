//! Time update helpers.
//!
//! [`update_world_time`] advances the frame clock once per frame, applying
//! `time_scale`. The fixed clock is fed from the scaled frame delta through
//! [`fixed_steps_due`] and advanced by [`advance_fixed_time`] after each
//! fixed tick has run.
use bevy_ecs::prelude::*;

use crate::resources::fixedtime::FixedTime;
use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is the unscaled frame delta in seconds.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt.max(0.0) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

/// Feed this frame's scaled delta to the fixed clock and return the number
/// of fixed ticks to run.
pub fn fixed_steps_due(world: &mut World) -> u32 {
    let delta = world.resource::<WorldTime>().delta;
    world.resource_mut::<FixedTime>().accumulate(delta)
}

pub fn advance_fixed_time(world: &mut World) {
    world.resource_mut::<FixedTime>().advance();
}
