//! Ability modules.
//!
//! An ability module is an independent, swappable unit of character
//! behaviour. Modules come in two capabilities:
//!
//! - [`AbilityModule`] – every module. Owns an identity and a lifecycle and
//!   may run once per frame through [`AbilityModule::process_ability`].
//! - [`MovementModule`] – modules that transform the character's velocity
//!   once per fixed tick through [`MovementModule::process_movement`].
//!
//! The character controller partitions modules into the two capabilities
//! once, when an [`AbilitySet`](set::AbilitySet) is equipped, and keeps
//! them in list order. Movement modules are folded over the body velocity in
//! that order, so reordering a set changes the resulting motion.
//!
//! Modules are described in designer data by an
//! [`AbilityModuleDef`](definition::AbilityModuleDef) and instantiated fresh
//! on each equip.

pub mod attack;
pub mod crouch;
pub mod definition;
pub mod double_jump;
pub mod fly;
pub mod horizontal_move;
pub mod inhale;
pub mod jump;
pub mod set;

use bevy_ecs::prelude::Entity;
use glam::Vec2;

use crate::components::boxcollider::BoxCollider;
use crate::components::groundsensor::GroundState;
use crate::resources::input::InputSnapshot;
use crate::resources::levelgeometry::ShapeCaster;
use crate::stats::StatStore;

pub use definition::{AbilityModuleDef, ModuleInstance, ModuleKind, ModuleType};
pub use set::{AbilitySet, AddModuleResult};

/// Timestamp that is older than any real time.
///
/// `now - NEVER` is `+inf`, so any window check against it fails.
pub const NEVER: f32 = f32::NEG_INFINITY;

/// Designer facing identity of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    pub ability_id: String,
    pub display_name: String,
}

impl ModuleIdentity {
    pub fn new(ability_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            ability_id: ability_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Lifecycle of an equipped module instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Uninitialized,
    Initialized,
    Active,
    Inactive,
}

/// Data handed to a module when it is bound to a controller.
#[derive(Debug, Clone, Copy)]
pub struct ModuleInit {
    /// Entity carrying the controller, if it lives in an ECS world.
    pub owner: Option<Entity>,
    pub now: f32,
}

/// Side effects produced by non-movement modules.
///
/// The controller hands them back to its caller; in the ECS they become
/// [`AbilityEffectEvent`](crate::events::ability::AbilityEffectEvent)s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEffect {
    Attack {
        damage: f32,
        range: f32,
        facing: f32,
    },
    Inhale {
        range: f32,
        power: f32,
        facing: f32,
    },
    InhaleReleased,
}

/// Per-frame context for [`AbilityModule::process_ability`].
pub struct AbilityContext<'a> {
    pub stats: &'a StatStore,
    pub ground: &'a GroundState,
    pub now: f32,
    pub dt: f32,
    /// -1.0 or 1.0.
    pub facing: f32,
    pub effects: &'a mut Vec<AbilityEffect>,
}

/// Per-fixed-tick context for [`MovementModule::process_movement`].
pub struct MovementContext<'a> {
    pub stats: &'a StatStore,
    pub ground: &'a GroundState,
    pub now: f32,
    pub dt: f32,
    /// World position of the body pivot.
    pub position: Vec2,
    pub collider: Option<&'a BoxCollider>,
    pub caster: &'a dyn ShapeCaster,
}

pub trait AbilityModule: Send + Sync {
    fn identity(&self) -> &ModuleIdentity;

    fn module_type(&self) -> ModuleType;

    /// Bind to a controller and reset private state. Called once per equip.
    fn initialize(&mut self, _init: &ModuleInit) {}

    fn on_activate(&mut self) {}

    fn on_deactivate(&mut self) {}

    /// Once per frame, for modules without movement capability.
    fn process_ability(&mut self, _input: &InputSnapshot, _ctx: &mut AbilityContext<'_>) {}

    /// Facing direction this module tracks, if any.
    fn facing(&self) -> Option<f32> {
        None
    }

    /// Observation flag for animation collaborators (e.g. `"flying"`).
    fn status_flag(&self) -> Option<&'static str> {
        None
    }
}

pub trait MovementModule: AbilityModule {
    /// Transform `velocity` for one fixed tick.
    ///
    /// Only private per-instance state may be read or written besides the
    /// arguments. Identical inputs and state give identical output.
    fn process_movement(
        &mut self,
        velocity: Vec2,
        is_grounded: bool,
        input: &InputSnapshot,
        ctx: &MovementContext<'_>,
    ) -> Vec2;
}

/// Move `current` toward `target` by at most `max_delta`.
pub(crate) fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
