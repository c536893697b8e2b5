//! Read-only observation of a character for animation, audio and UI.
//!
//! Written once per frame by
//! [`publish_character_status`](crate::systems::charactercontroller::publish_character_status).
//! Nothing in the ability pipeline reads it back.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use rustc_hash::FxHashSet;

use super::groundsensor::SlopeClass;

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct CharacterStatus {
    pub grounded: bool,
    pub slope_class: SlopeClass,
    pub slope_angle: f32,
    pub velocity: Vec2,
    /// -1.0 or 1.0.
    pub facing: f32,
    /// Id of the equipped ability set, if any.
    pub equipped_set: Option<String>,
    /// Flags raised by active modules (`"running"`, `"flying"`, ...).
    pub flags: FxHashSet<&'static str>,
    pub disabled: bool,
}

impl CharacterStatus {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}
