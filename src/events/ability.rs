//! Effects raised by non-movement ability modules.
//!
//! The frame system triggers one [`AbilityEffectEvent`] per effect, in
//! module list order. Gameplay code (hit boxes, inhale targets, audio)
//! subscribes with its own observers; [`log_ability_effect`] only traces
//! them.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::abilities::AbilityEffect;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AbilityEffectEvent {
    pub entity: Entity,
    pub effect: AbilityEffect,
}

pub fn log_ability_effect(trigger: On<AbilityEffectEvent>) {
    let event = trigger.event();
    debug!("{:?}: {:?}", event.entity, event.effect);
}
