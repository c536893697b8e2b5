//! Flap-to-fly flight.
//!
//! ```text
//!                jump press, airborne
//!   NotFlying ─────────────────────────▶ Flying
//!       ▲                                  │
//!       └──── grounded / attack press ◀────┘
//! ```
//!
//! Entering flight applies `flap_impulse` and starts the flap cooldown.
//! While flying, holding jump flaps again each time the cooldown elapses or
//! on a fresh press; with jump released, falling velocity is damped by
//! `float_descent_speed` every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    AbilityModule, ModuleIdentity, ModuleInit, ModuleType, MovementContext, MovementModule, NEVER,
};
use crate::resources::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    NotFlying,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyConfig {
    /// Seconds between flaps while jump is held.
    pub flap_cooldown: f32,
}

impl Default for FlyConfig {
    fn default() -> Self {
        Self {
            flap_cooldown: 0.25,
        }
    }
}

pub struct Fly {
    identity: ModuleIdentity,
    config: FlyConfig,
    state: FlightState,
    last_flap_time: f32,
}

impl Fly {
    pub fn new(identity: ModuleIdentity, config: FlyConfig) -> Self {
        Self {
            identity,
            config,
            state: FlightState::NotFlying,
            last_flap_time: NEVER,
        }
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    fn flap(&mut self, velocity: Vec2, ctx: &MovementContext<'_>) -> Vec2 {
        self.last_flap_time = ctx.now;
        Vec2::new(velocity.x, ctx.stats.flap_impulse)
    }
}

impl AbilityModule for Fly {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::Fly
    }

    fn initialize(&mut self, _init: &ModuleInit) {
        self.state = FlightState::NotFlying;
        self.last_flap_time = NEVER;
    }

    fn on_deactivate(&mut self) {
        self.state = FlightState::NotFlying;
    }

    fn status_flag(&self) -> Option<&'static str> {
        (self.state == FlightState::Flying).then_some("flying")
    }
}

impl MovementModule for Fly {
    fn process_movement(
        &mut self,
        velocity: Vec2,
        is_grounded: bool,
        input: &InputSnapshot,
        ctx: &MovementContext<'_>,
    ) -> Vec2 {
        if is_grounded {
            self.state = FlightState::NotFlying;
            return velocity;
        }

        match self.state {
            FlightState::NotFlying => {
                if input.jump.just_pressed {
                    self.state = FlightState::Flying;
                    return self.flap(velocity, ctx);
                }
                velocity
            }
            FlightState::Flying => {
                if input.attack.just_pressed {
                    self.state = FlightState::NotFlying;
                    return velocity;
                }
                let cooldown_elapsed = ctx.now - self.last_flap_time >= self.config.flap_cooldown;
                if input.jump.pressed && (cooldown_elapsed || input.jump.just_pressed) {
                    return self.flap(velocity, ctx);
                }
                if !input.jump.pressed && velocity.y < 0.0 {
                    return Vec2::new(velocity.x, velocity.y * ctx.stats.float_descent_speed);
                }
                velocity
            }
        }
    }
}
