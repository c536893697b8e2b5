//! Character controller systems.
//!
//! Frame schedule:
//! - [`validate_controllers`] checks new controllers once and equips their
//!   initial ability set
//! - [`character_frame_system`] runs non-movement modules and triggers an
//!   [`AbilityEffectEvent`] per effect
//! - [`publish_character_status`] refreshes the observation component
//!
//! Fixed schedule:
//! - [`character_fixed_system`] folds movement modules over body velocity
use bevy_ecs::prelude::*;

use crate::abilities::ModuleInit;
use crate::components::boxcollider::BoxCollider;
use crate::components::charactercontroller::{BodyProbe, CharacterController, TickTime};
use crate::components::characterstatus::CharacterStatus;
use crate::components::controlinput::ControlInput;
use crate::components::groundsensor::{GroundSensor, GroundState};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::ability::AbilityEffectEvent;
use crate::resources::fixedtime::FixedTime;
use crate::resources::levelgeometry::LevelGeometry;
use crate::resources::worldtime::WorldTime;

/// Validate controllers added since the last run.
///
/// A controller without an input source or a body is disabled for good.
/// Valid controllers equip their `initial_set`, if any.
pub fn validate_controllers(
    time: Res<WorldTime>,
    mut query: Query<
        (
            Entity,
            &mut CharacterController,
            Has<ControlInput>,
            Option<&mut RigidBody>,
        ),
        Added<CharacterController>,
    >,
) {
    for (entity, mut controller, has_input, body) in query.iter_mut() {
        if controller.validate(has_input, body.is_some()).is_err() {
            continue;
        }
        let Some(mut body) = body else {
            continue;
        };
        let initial = controller.initial_set.clone();
        if initial.is_some() {
            controller.equip_ability_set(
                initial,
                &mut body,
                ModuleInit {
                    owner: Some(entity),
                    now: time.elapsed,
                },
            );
        } else {
            controller.refresh_stats();
            controller.push_body_stats(&mut body);
        }
    }
}

pub fn character_frame_system(
    time: Res<WorldTime>,
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &mut CharacterController,
        &ControlInput,
        Option<&GroundSensor>,
        &mut RigidBody,
    )>,
) {
    let tick = TickTime {
        now: time.elapsed,
        dt: time.delta,
    };
    for (entity, mut controller, input, sensor, mut body) in query.iter_mut() {
        let ground = sensor.map_or_else(GroundState::airborne, |s| *s.state());
        let effects = controller.on_frame(input.frame(), &ground, &mut body, tick);
        for effect in effects {
            commands.trigger(AbilityEffectEvent { entity, effect });
        }
    }
}

pub fn character_fixed_system(
    fixed: Res<FixedTime>,
    level: Option<Res<LevelGeometry>>,
    mut query: Query<(
        &mut CharacterController,
        &ControlInput,
        Option<&GroundSensor>,
        &mut RigidBody,
        &MapPosition,
        Option<&BoxCollider>,
    )>,
) {
    let empty = LevelGeometry::default();
    let level = level.as_deref().unwrap_or(&empty);
    let tick = TickTime {
        now: fixed.elapsed,
        dt: fixed.timestep,
    };
    for (mut controller, input, sensor, mut body, position, collider) in query.iter_mut() {
        let ground = sensor.map_or_else(GroundState::airborne, |s| *s.state());
        let probe = BodyProbe {
            position: position.pos,
            collider,
            caster: level,
        };
        controller.on_fixed_tick(input.fixed(), &ground, &mut body, probe, tick);
    }
}

pub fn publish_character_status(
    mut query: Query<(
        &CharacterController,
        &mut CharacterStatus,
        Option<&GroundSensor>,
        Option<&RigidBody>,
    )>,
) {
    for (controller, mut status, sensor, body) in query.iter_mut() {
        let ground = sensor.map_or_else(GroundState::airborne, |s| *s.state());
        status.grounded = ground.is_grounded;
        status.slope_class = ground.slope_class;
        status.slope_angle = ground.slope_angle;
        status.velocity = body.map_or(glam::Vec2::ZERO, |b| b.velocity);
        status.facing = controller.facing();
        status.disabled = !controller.is_active();
        if status.equipped_set.as_deref() != controller.equipped_set_id() {
            status.equipped_set = controller.equipped_set_id().map(str::to_owned);
        }
        status.flags.clear();
        status.flags.extend(controller.status_flags());
    }
}
