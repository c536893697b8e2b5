//! Physics integration for rigid bodies, once per fixed tick.
//!
//! Gravity from [`GameConfig`] scaled by each body's `gravity_scale`, the
//! body's fall speed clamp, then movement against the level. Bodies without
//! a collider move freely.
use bevy_ecs::prelude::*;
use log::trace;

use crate::components::boxcollider::BoxCollider;
use crate::components::groundsensor::GroundSensor;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::resources::fixedtime::FixedTime;
use crate::resources::gameconfig::GameConfig;
use crate::resources::levelgeometry::{CollisionLayers, LevelGeometry};

pub fn movement_system(
    fixed: Res<FixedTime>,
    config: Res<GameConfig>,
    level: Option<Res<LevelGeometry>>,
    mut query: Query<(
        Entity,
        &mut MapPosition,
        &mut RigidBody,
        Option<&BoxCollider>,
        Option<&GroundSensor>,
    )>,
) {
    let dt = fixed.timestep;
    let gravity = config.gravity;
    for (entity, mut position, mut body, collider, sensor) in query.iter_mut() {
        body.integrate_gravity(gravity, dt);

        let (Some(collider), Some(level)) = (collider, level.as_deref()) else {
            let delta = body.velocity * dt;
            position.translate(delta);
            continue;
        };

        let grounded = sensor.is_some_and(|s| s.state().is_grounded);
        let mask = sensor.map_or(CollisionLayers::SOLID, |s| s.config.layer_mask);
        let result = level.move_and_collide(
            collider,
            position.pos,
            body.velocity,
            dt,
            mask,
            grounded && body.velocity.y <= 0.0,
        );
        if result.hit_wall || result.hit_ceiling {
            trace!(
                "{:?} blocked at {:?} (wall={}, ceiling={})",
                entity, result.position, result.hit_wall, result.hit_ceiling
            );
        }
        position.pos = result.position;
        body.velocity = result.velocity;
    }
}
