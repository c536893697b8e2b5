//! Inhale: pull things in while attack is held.
//!
//! Emits an [`AbilityEffect::Inhale`] every frame the button is held and a
//! single [`AbilityEffect::InhaleReleased`] when it is let go.

use super::{AbilityContext, AbilityEffect, AbilityModule, ModuleIdentity, ModuleType};
use crate::resources::input::InputSnapshot;

pub struct Inhale {
    identity: ModuleIdentity,
    inhaling: bool,
}

impl Inhale {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            inhaling: false,
        }
    }
}

impl AbilityModule for Inhale {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::Inhale
    }

    fn on_deactivate(&mut self) {
        self.inhaling = false;
    }

    fn process_ability(&mut self, input: &InputSnapshot, ctx: &mut AbilityContext<'_>) {
        if input.attack.pressed {
            self.inhaling = true;
            ctx.effects.push(AbilityEffect::Inhale {
                range: ctx.stats.inhale_range,
                power: ctx.stats.inhale_power,
                facing: ctx.facing,
            });
        } else if self.inhaling {
            self.inhaling = false;
            ctx.effects.push(AbilityEffect::InhaleReleased);
        }
    }

    fn status_flag(&self) -> Option<&'static str> {
        self.inhaling.then_some("inhaling")
    }
}
