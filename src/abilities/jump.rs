//! Grounded jump with coyote time, jump buffering and variable height.
//!
//! Two timestamps carry all the history the module needs:
//!
//! - `last_grounded_time` – refreshed on every grounded tick
//! - `jump_pressed_time` – refreshed on every jump press edge
//!
//! The jump fires on any tick where both are inside their windows
//! (`coyote_time` and `jump_buffer_time`). Firing resets both to [`NEVER`]
//! so one press cannot jump twice.
//!
//! While moving up with the button not held, vertical velocity is scaled by
//! `jump_release_velocity_multiplier` on every tick, so an early release
//! decays the ascent tick after tick until gravity takes over.

use glam::Vec2;

use super::{
    AbilityModule, ModuleIdentity, ModuleInit, ModuleType, MovementContext, MovementModule, NEVER,
};
use crate::resources::input::InputSnapshot;

pub struct Jump {
    identity: ModuleIdentity,
    last_grounded_time: f32,
    jump_pressed_time: f32,
}

impl Jump {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            last_grounded_time: NEVER,
            jump_pressed_time: NEVER,
        }
    }
}

impl AbilityModule for Jump {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::Jump
    }

    fn initialize(&mut self, _init: &ModuleInit) {
        self.last_grounded_time = NEVER;
        self.jump_pressed_time = NEVER;
    }
}

impl MovementModule for Jump {
    fn process_movement(
        &mut self,
        velocity: Vec2,
        is_grounded: bool,
        input: &InputSnapshot,
        ctx: &MovementContext<'_>,
    ) -> Vec2 {
        let stats = ctx.stats;
        let now = ctx.now;
        let mut v = velocity;

        if is_grounded {
            self.last_grounded_time = now;
        }
        if input.jump.just_pressed {
            self.jump_pressed_time = now;
        }

        let in_coyote = now - self.last_grounded_time <= stats.coyote_time;
        let buffered = now - self.jump_pressed_time <= stats.jump_buffer_time;
        if in_coyote && buffered {
            v.y = stats.jump_velocity;
            self.last_grounded_time = NEVER;
            self.jump_pressed_time = NEVER;
        }

        if v.y > 0.0 && !input.jump.pressed {
            v.y *= stats.jump_release_velocity_multiplier;
        }
        v
    }
}
