//! One extra jump per airborne phase.
//!
//! The air jump is only taken outside the coyote window, where the regular
//! [`Jump`](super::jump::Jump) module can no longer fire, so a single press
//! never spends both jumps.

use glam::Vec2;

use super::{
    AbilityModule, ModuleIdentity, ModuleInit, ModuleType, MovementContext, MovementModule, NEVER,
};
use crate::resources::input::InputSnapshot;

pub struct DoubleJump {
    identity: ModuleIdentity,
    has_double_jumped: bool,
    last_grounded_time: f32,
}

impl DoubleJump {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            has_double_jumped: false,
            last_grounded_time: NEVER,
        }
    }

    pub fn has_double_jumped(&self) -> bool {
        self.has_double_jumped
    }
}

impl AbilityModule for DoubleJump {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::DoubleJump
    }

    fn initialize(&mut self, _init: &ModuleInit) {
        self.has_double_jumped = false;
        self.last_grounded_time = NEVER;
    }
}

impl MovementModule for DoubleJump {
    fn process_movement(
        &mut self,
        velocity: Vec2,
        is_grounded: bool,
        input: &InputSnapshot,
        ctx: &MovementContext<'_>,
    ) -> Vec2 {
        if is_grounded {
            self.has_double_jumped = false;
            self.last_grounded_time = ctx.now;
            return velocity;
        }

        let past_coyote = ctx.now - self.last_grounded_time > ctx.stats.coyote_time;
        if input.jump.just_pressed && past_coyote && !self.has_double_jumped {
            self.has_double_jumped = true;
            return Vec2::new(velocity.x, ctx.stats.jump_velocity);
        }
        velocity
    }
}
