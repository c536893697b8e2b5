//! Character controller: the per-character orchestrator of ability modules.
//!
//! The controller owns the base and derived [`StatStore`], the equipped
//! [`AbilitySet`] and the live module instances, partitioned once per equip
//! into movement modules and other modules. It has two entry points, driven
//! by the host at two different rates:
//!
//! - [`CharacterController::on_frame`] re-derives stats and runs every
//!   non-movement module once, returning the effects they produced
//! - [`CharacterController::on_fixed_tick`] folds every movement module over
//!   the body velocity in list order and writes the result back once
//!
//! A controller that lacks a required dependency is disabled when first
//! validated and stays inert afterwards.

use std::sync::Arc;

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use log::{debug, error, info, warn};
use smallvec::SmallVec;
use thiserror::Error;

use super::boxcollider::BoxCollider;
use super::groundsensor::GroundState;
use super::rigidbody::RigidBody;
use crate::abilities::{
    AbilityContext, AbilityEffect, AbilityModule, AbilitySet, ModuleIdentity, ModuleInit,
    ModuleInstance, ModuleState, ModuleType, MovementContext, MovementModule,
};
use crate::resources::input::InputSnapshot;
use crate::resources::levelgeometry::ShapeCaster;
use crate::stats::StatStore;

/// Why a controller refuses to tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisabledReason {
    #[error("no input source bound")]
    MissingInput,
    #[error("no physics body")]
    MissingBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    Active,
    Disabled(DisabledReason),
}

/// Time of the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTime {
    pub now: f32,
    pub dt: f32,
}

/// What movement modules may query about the body's surroundings.
#[derive(Clone, Copy)]
pub struct BodyProbe<'a> {
    pub position: Vec2,
    pub collider: Option<&'a BoxCollider>,
    pub caster: &'a dyn ShapeCaster,
}

struct ModuleSlot<M: ?Sized> {
    module: Box<M>,
    state: ModuleState,
}

impl<M: AbilityModule + ?Sized> ModuleSlot<M> {
    fn bind(mut module: Box<M>, init: &ModuleInit) -> Self {
        module.initialize(init);
        let mut slot = Self {
            module,
            state: ModuleState::Initialized,
        };
        slot.module.on_activate();
        slot.state = ModuleState::Active;
        slot
    }

    fn release(&mut self) {
        if self.state == ModuleState::Active {
            self.module.on_deactivate();
        }
        self.state = ModuleState::Inactive;
    }
}

/// Read-only view of one equipped module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleInfo<'a> {
    pub identity: &'a ModuleIdentity,
    pub module_type: ModuleType,
    pub state: ModuleState,
}

#[derive(Component)]
pub struct CharacterController {
    base_stats: StatStore,
    derived_stats: StatStore,
    equipped: Option<Arc<AbilitySet>>,
    /// Set equipped when the controller is validated.
    pub initial_set: Option<Arc<AbilitySet>>,
    movement_modules: Vec<ModuleSlot<dyn MovementModule>>,
    other_modules: Vec<ModuleSlot<dyn AbilityModule>>,
    status: ControllerStatus,
}

impl CharacterController {
    /// Controller over `base_stats`; a missing store falls back to defaults.
    pub fn new(base_stats: Option<StatStore>) -> Self {
        let base_stats = base_stats.unwrap_or_else(|| {
            warn!("Character controller created without base stats, using default stats");
            StatStore::default()
        });
        Self {
            derived_stats: base_stats.clone(),
            base_stats,
            equipped: None,
            initial_set: None,
            movement_modules: Vec::new(),
            other_modules: Vec::new(),
            status: ControllerStatus::Active,
        }
    }

    pub fn with_initial_set(mut self, set: Arc<AbilitySet>) -> Self {
        self.initial_set = Some(set);
        self
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ControllerStatus::Active
    }

    /// Check required dependencies. On failure the controller is disabled.
    pub fn validate(&mut self, has_input: bool, has_body: bool) -> Result<(), DisabledReason> {
        let missing = if !has_input {
            Some(DisabledReason::MissingInput)
        } else if !has_body {
            Some(DisabledReason::MissingBody)
        } else {
            None
        };
        match missing {
            Some(reason) => {
                self.disable(reason);
                Err(reason)
            }
            None => Ok(()),
        }
    }

    /// Stop ticking. Reported once.
    pub fn disable(&mut self, reason: DisabledReason) {
        if let ControllerStatus::Disabled(first) = self.status {
            debug!("Character controller already disabled ({}), ignoring {}", first, reason);
            return;
        }
        error!("Character controller disabled: {}", reason);
        self.status = ControllerStatus::Disabled(reason);
    }

    pub fn base_stats(&self) -> &StatStore {
        &self.base_stats
    }

    /// Replace the base stats. Derived stats follow on the next refresh.
    pub fn set_base_stats(&mut self, stats: StatStore) {
        self.base_stats = stats;
        self.refresh_stats();
    }

    pub fn derived_stats(&self) -> &StatStore {
        &self.derived_stats
    }

    pub fn equipped_set(&self) -> Option<&Arc<AbilitySet>> {
        self.equipped.as_ref()
    }

    pub fn equipped_set_id(&self) -> Option<&str> {
        self.equipped.as_deref().map(|set| set.id.as_str())
    }

    /// Equipped modules, movement modules first, each group in list order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleInfo<'_>> {
        let movement = self.movement_modules.iter().map(|s| ModuleInfo {
            identity: s.module.identity(),
            module_type: s.module.module_type(),
            state: s.state,
        });
        let other = self.other_modules.iter().map(|s| ModuleInfo {
            identity: s.module.identity(),
            module_type: s.module.module_type(),
            state: s.state,
        });
        movement.chain(other)
    }

    pub fn movement_module_count(&self) -> usize {
        self.movement_modules.len()
    }

    pub fn other_module_count(&self) -> usize {
        self.other_modules.len()
    }

    /// Facing of the first module that tracks one, else right.
    pub fn facing(&self) -> f32 {
        self.movement_modules
            .iter()
            .filter_map(|s| s.module.facing())
            .chain(self.other_modules.iter().filter_map(|s| s.module.facing()))
            .next()
            .unwrap_or(1.0)
    }

    pub fn status_flags(&self) -> SmallVec<[&'static str; 4]> {
        self.movement_modules
            .iter()
            .filter_map(|s| s.module.status_flag())
            .chain(self.other_modules.iter().filter_map(|s| s.module.status_flag()))
            .collect()
    }

    /// Swap the equipped set.
    ///
    /// Every current module is deactivated and dropped before any module of
    /// the new set is initialized. `None` unequips. Stats are re-derived and
    /// pushed to `body`.
    pub fn equip_ability_set(
        &mut self,
        set: Option<Arc<AbilitySet>>,
        body: &mut RigidBody,
        init: ModuleInit,
    ) {
        for slot in &mut self.movement_modules {
            slot.release();
        }
        for slot in &mut self.other_modules {
            slot.release();
        }
        self.movement_modules.clear();
        self.other_modules.clear();

        if let Some(set) = &set {
            for def in set.modules() {
                match def.instantiate() {
                    ModuleInstance::Movement(module) => {
                        self.movement_modules.push(ModuleSlot::bind(module, &init));
                    }
                    ModuleInstance::Other(module) => {
                        self.other_modules.push(ModuleSlot::bind(module, &init));
                    }
                }
            }
        }

        let previous = self.equipped_set_id().map(str::to_owned);
        self.equipped = set;
        info!(
            "Equipped ability set {:?} (was {:?}): {} movement, {} other modules",
            self.equipped_set_id(),
            previous,
            self.movement_modules.len(),
            self.other_modules.len()
        );

        self.refresh_stats();
        self.push_body_stats(body);
    }

    /// Re-derive stats from the base store and the equipped set.
    pub fn refresh_stats(&mut self) {
        self.derived_stats = match &self.equipped {
            Some(set) => set.derive_stats(&self.base_stats),
            None => self.base_stats.clone(),
        };
    }

    /// Copy the stats the physics body consumes directly.
    pub fn push_body_stats(&self, body: &mut RigidBody) {
        body.gravity_scale = self.derived_stats.gravity_scale;
        body.max_fall_speed = Some(self.derived_stats.max_fall_speed);
    }

    /// Frame entry point. Returns the effects raised by non-movement modules.
    pub fn on_frame(
        &mut self,
        input: &InputSnapshot,
        ground: &GroundState,
        body: &mut RigidBody,
        time: TickTime,
    ) -> Vec<AbilityEffect> {
        let mut effects = Vec::new();
        if !self.is_active() {
            return effects;
        }
        self.refresh_stats();
        self.push_body_stats(body);

        let facing = self.facing();
        let mut ctx = AbilityContext {
            stats: &self.derived_stats,
            ground,
            now: time.now,
            dt: time.dt,
            facing,
            effects: &mut effects,
        };
        for slot in &mut self.other_modules {
            slot.module.process_ability(input, &mut ctx);
        }
        effects
    }

    /// Fixed-tick entry point. Folds the movement modules over the body
    /// velocity and writes the result back.
    pub fn on_fixed_tick(
        &mut self,
        input: &InputSnapshot,
        ground: &GroundState,
        body: &mut RigidBody,
        probe: BodyProbe<'_>,
        time: TickTime,
    ) {
        if !self.is_active() {
            return;
        }
        let ctx = MovementContext {
            stats: &self.derived_stats,
            ground,
            now: time.now,
            dt: time.dt,
            position: probe.position,
            collider: probe.collider,
            caster: probe.caster,
        };
        let velocity = self
            .movement_modules
            .iter_mut()
            .fold(body.velocity, |v, slot| {
                slot.module
                    .process_movement(v, ground.is_grounded, input, &ctx)
            });
        body.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::definition::{AbilityModuleDef, ModuleKind};
    use crate::abilities::horizontal_move::HorizontalMoveConfig;
    use crate::resources::input::DigitalButtonState;
    use crate::resources::levelgeometry::LevelGeometry;
    use crate::stats::{StatId, StatModifier};

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn init() -> ModuleInit {
        ModuleInit {
            owner: None,
            now: 0.0,
        }
    }

    fn movement_set() -> Arc<AbilitySet> {
        Arc::new(
            AbilitySet::new("walker")
                .with_global_modifier(StatModifier::multiplicative(StatId::GravityScale, 2.0))
                .with_module(AbilityModuleDef::new(
                    "move",
                    ModuleKind::HorizontalMove(HorizontalMoveConfig::default()),
                ))
                .with_module(AbilityModuleDef::new("jump", ModuleKind::Jump))
                .with_module(AbilityModuleDef::new("attack", ModuleKind::MeleeAttack)),
        )
    }

    #[test]
    fn missing_base_stats_fall_back_to_defaults() {
        let controller = CharacterController::new(None);
        assert_eq!(controller.base_stats(), &StatStore::default());
        assert_eq!(controller.derived_stats(), &StatStore::default());
    }

    #[test]
    fn equip_partitions_modules_and_pushes_body_stats() {
        let mut controller = CharacterController::new(Some(StatStore::default()));
        let mut body = RigidBody::new();
        controller.equip_ability_set(Some(movement_set()), &mut body, init());

        assert_eq!(controller.movement_module_count(), 2);
        assert_eq!(controller.other_module_count(), 1);
        assert!(controller.modules().all(|m| m.state == ModuleState::Active));
        let order: Vec<_> = controller.modules().map(|m| m.module_type).collect();
        assert_eq!(
            order,
            vec![ModuleType::HorizontalMove, ModuleType::Jump, ModuleType::MeleeAttack]
        );
        assert!(approx_eq(body.gravity_scale, 2.0));
        assert_eq!(controller.equipped_set_id(), Some("walker"));
    }

    #[test]
    fn unequip_restores_base_stats() {
        let mut controller = CharacterController::new(Some(StatStore::default()));
        let mut body = RigidBody::new();
        controller.equip_ability_set(Some(movement_set()), &mut body, init());
        controller.equip_ability_set(None, &mut body, init());
        assert_eq!(controller.modules().count(), 0);
        assert_eq!(controller.derived_stats(), controller.base_stats());
        assert!(approx_eq(body.gravity_scale, 1.0));
        assert_eq!(controller.equipped_set_id(), None);
    }

    #[test]
    fn fixed_tick_folds_and_writes_velocity() {
        let mut controller = CharacterController::new(Some(StatStore {
            walk_speed: 4.0,
            ground_acceleration: 50.0,
            ..StatStore::default()
        }));
        let mut body = RigidBody::new();
        controller.equip_ability_set(Some(movement_set()), &mut body, init());

        let level = LevelGeometry::default();
        let input = InputSnapshot {
            walk_axis: 1.0,
            ..InputSnapshot::default()
        };
        let ground = GroundState {
            is_grounded: true,
            ..GroundState::default()
        };
        controller.on_fixed_tick(
            &input,
            &ground,
            &mut body,
            BodyProbe {
                position: Vec2::ZERO,
                collider: None,
                caster: &level,
            },
            TickTime { now: 1.0, dt: 0.02 },
        );
        assert!(approx_eq(body.velocity.x, 1.0));
        assert!(approx_eq(body.velocity.y, 0.0));
    }

    #[test]
    fn frame_runs_other_modules_only() {
        let mut controller = CharacterController::new(Some(StatStore::default()));
        let mut body = RigidBody::new();
        controller.equip_ability_set(Some(movement_set()), &mut body, init());

        let input = InputSnapshot {
            attack: DigitalButtonState {
                pressed: true,
                just_pressed: true,
                just_released: false,
            },
            ..InputSnapshot::default()
        };
        let effects = controller.on_frame(
            &input,
            &GroundState::default(),
            &mut body,
            TickTime { now: 1.0, dt: 0.016 },
        );
        assert!(matches!(effects[..], [AbilityEffect::Attack { facing, .. }] if facing == 1.0));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn disabled_controller_is_inert() {
        let mut controller = CharacterController::new(None);
        let mut body = RigidBody::new().with_velocity(Vec2::new(3.0, 0.0));
        controller.equip_ability_set(Some(movement_set()), &mut body, init());
        assert_eq!(
            controller.validate(false, true),
            Err(DisabledReason::MissingInput)
        );
        // Reported once; a second failure keeps the first reason.
        controller.disable(DisabledReason::MissingBody);
        assert_eq!(
            controller.validate(true, false),
            Err(DisabledReason::MissingBody)
        );
        assert_eq!(
            controller.status(),
            ControllerStatus::Disabled(DisabledReason::MissingInput)
        );

        let level = LevelGeometry::default();
        controller.on_fixed_tick(
            &InputSnapshot::default(),
            &GroundState::default(),
            &mut body,
            BodyProbe {
                position: Vec2::ZERO,
                collider: None,
                caster: &level,
            },
            TickTime { now: 1.0, dt: 0.02 },
        );
        assert_eq!(body.velocity, Vec2::new(3.0, 0.0));
    }
}
