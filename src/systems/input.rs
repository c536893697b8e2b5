//! Input systems.
//!
//! - [`sample_control_input`] runs once per frame and asks every
//!   [`ControlInput`] driver for this frame's raw intent.
//! - [`latch_fixed_input`] runs at the start of every fixed tick and hands
//!   the accumulated edges to that tick.
use bevy_ecs::prelude::*;

use crate::components::controlinput::ControlInput;
use crate::components::rigidbody::RigidBody;
use crate::resources::worldtime::WorldTime;

pub fn sample_control_input(
    time: Res<WorldTime>,
    mut query: Query<(&mut ControlInput, Option<&RigidBody>)>,
) {
    for (mut input, body) in query.iter_mut() {
        let speed_x = body.map_or(0.0, |b| b.velocity.x);
        input.sample(time.elapsed, speed_x);
    }
}

pub fn latch_fixed_input(mut query: Query<&mut ControlInput>) {
    for mut input in query.iter_mut() {
        input.latch_fixed();
    }
}
