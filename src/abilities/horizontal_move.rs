//! Ground and air horizontal movement.
//!
//! Walk and run are read from two independent axes. The run axis wins when
//! it is outside the deadzone. The current horizontal velocity is moved
//! toward the target speed at the acceleration rate (with input) or the
//! deceleration rate (without input), picking the ground or air variant from
//! the grounded flag, and clamped to 110% of the selected top speed.
//!
//! A short forward box cast stops acceleration into walls. Deceleration is
//! never blocked.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    AbilityModule, ModuleIdentity, ModuleInit, ModuleType, MovementContext, MovementModule,
    move_towards,
};
use crate::resources::input::InputSnapshot;
use crate::resources::levelgeometry::CollisionLayers;

/// Headroom over the top speed before velocity is clamped.
pub const SPEED_CLAMP_FACTOR: f32 = 1.1;

/// A cast hit only counts as a wall when its normal is this horizontal.
const WALL_NORMAL_MIN_X: f32 = 0.7;

/// Vertical inset of the wall cast so it does not touch floor or ceiling.
const WALL_PROBE_SKIN: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalMoveConfig {
    pub run_deadzone: f32,
    pub wall_check_distance: f32,
    pub wall_layers: CollisionLayers,
}

impl Default for HorizontalMoveConfig {
    fn default() -> Self {
        Self {
            run_deadzone: 0.1,
            wall_check_distance: 0.05,
            wall_layers: CollisionLayers::SOLID,
        }
    }
}

pub struct HorizontalMove {
    identity: ModuleIdentity,
    config: HorizontalMoveConfig,
    facing: f32,
    is_running: bool,
}

impl HorizontalMove {
    pub fn new(identity: ModuleIdentity, config: HorizontalMoveConfig) -> Self {
        Self {
            identity,
            config,
            facing: 1.0,
            is_running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    fn wall_ahead(&self, ctx: &MovementContext<'_>, direction: f32) -> bool {
        let Some(collider) = ctx.collider else {
            return false;
        };
        let size = Vec2::new(collider.size.x.abs(), (collider.size.y.abs() - 2.0 * WALL_PROBE_SKIN).max(0.0));
        ctx.caster
            .box_cast(
                collider.center(ctx.position),
                size,
                Vec2::new(direction, 0.0),
                self.config.wall_check_distance,
                self.config.wall_layers,
            )
            .is_some_and(|hit| hit.normal.x.abs() >= WALL_NORMAL_MIN_X && hit.normal.x * direction < 0.0)
    }
}

impl AbilityModule for HorizontalMove {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::HorizontalMove
    }

    fn initialize(&mut self, _init: &ModuleInit) {
        self.facing = 1.0;
        self.is_running = false;
    }

    fn facing(&self) -> Option<f32> {
        Some(self.facing)
    }

    fn status_flag(&self) -> Option<&'static str> {
        self.is_running.then_some("running")
    }
}

impl MovementModule for HorizontalMove {
    fn process_movement(
        &mut self,
        velocity: Vec2,
        is_grounded: bool,
        input: &InputSnapshot,
        ctx: &MovementContext<'_>,
    ) -> Vec2 {
        let deadzone = self.config.run_deadzone;
        let (axis, running) = if input.run_axis.abs() > deadzone {
            (input.run_axis.clamp(-1.0, 1.0), true)
        } else {
            (input.walk_axis.clamp(-1.0, 1.0), false)
        };
        self.is_running = running;

        let has_input = axis.abs() > deadzone;
        if has_input {
            self.facing = axis.signum();
        }

        let top_speed = if running {
            ctx.stats.run_speed
        } else {
            ctx.stats.walk_speed
        };
        let accelerating = has_input && !self.wall_ahead(ctx, axis.signum());
        let (target, rate) = match (accelerating, is_grounded) {
            (true, true) => (axis * top_speed, ctx.stats.ground_acceleration),
            (true, false) => (axis * top_speed, ctx.stats.air_acceleration),
            (false, true) => (0.0, ctx.stats.ground_deceleration),
            (false, false) => (0.0, ctx.stats.air_deceleration),
        };

        let limit = (top_speed * SPEED_CLAMP_FACTOR).abs();
        let vx = move_towards(velocity.x, target, rate * ctx.dt).clamp(-limit, limit);
        Vec2::new(vx, velocity.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::testing::Fixture;
    use crate::components::boxcollider::BoxCollider;
    use crate::resources::levelgeometry::{LevelGeometry, Solid};

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn module() -> HorizontalMove {
        HorizontalMove::new(ModuleIdentity::new("walk", "Walk"), HorizontalMoveConfig::default())
    }

    fn walk_input(axis: f32) -> InputSnapshot {
        InputSnapshot {
            walk_axis: axis,
            ..InputSnapshot::default()
        }
    }

    #[test]
    fn accelerates_from_rest_on_ground() {
        let mut fx = Fixture::new();
        fx.stats.walk_speed = 4.0;
        fx.stats.ground_acceleration = 50.0;
        let mut m = module();
        let v = m.process_movement(Vec2::ZERO, true, &walk_input(1.0), &fx.ctx(0.0));
        assert!(approx_eq(v.x, 1.0));
        assert!(approx_eq(v.y, 0.0));
    }

    #[test]
    fn reaches_and_holds_target_speed() {
        let mut fx = Fixture::new();
        fx.stats.walk_speed = 4.0;
        fx.stats.ground_acceleration = 50.0;
        let mut m = module();
        let mut v = Vec2::ZERO;
        for i in 0..20 {
            v = m.process_movement(v, true, &walk_input(1.0), &fx.ctx(i as f32 * fx.dt));
        }
        assert!(approx_eq(v.x, 4.0));
    }

    #[test]
    fn run_axis_takes_priority_over_walk() {
        let fx = Fixture::new();
        let mut m = module();
        let input = InputSnapshot {
            walk_axis: 1.0,
            run_axis: -1.0,
            ..InputSnapshot::default()
        };
        let v = m.process_movement(Vec2::ZERO, true, &input, &fx.ctx(0.0));
        assert!(v.x < 0.0);
        assert!(m.is_running());
        assert_eq!(m.facing(), Some(-1.0));
    }

    #[test]
    fn decelerates_without_input_using_air_rate_when_airborne() {
        let mut fx = Fixture::new();
        fx.stats.air_deceleration = 10.0;
        let mut m = module();
        let v = m.process_movement(Vec2::new(3.0, -2.0), false, &walk_input(0.0), &fx.ctx(0.0));
        assert!(approx_eq(v.x, 3.0 - 10.0 * fx.dt));
        assert!(approx_eq(v.y, -2.0));
    }

    #[test]
    fn clamps_to_top_speed_headroom() {
        let mut fx = Fixture::new();
        fx.stats.walk_speed = 4.0;
        let mut m = module();
        let v = m.process_movement(Vec2::new(9.0, 0.0), true, &walk_input(1.0), &fx.ctx(0.0));
        assert!(approx_eq(v.x, 4.0 * SPEED_CLAMP_FACTOR));
    }

    #[test]
    fn facing_is_kept_without_input() {
        let fx = Fixture::new();
        let mut m = module();
        m.process_movement(Vec2::ZERO, true, &walk_input(-1.0), &fx.ctx(0.0));
        m.process_movement(Vec2::ZERO, true, &walk_input(0.0), &fx.ctx(0.02));
        assert_eq!(m.facing(), Some(-1.0));
    }

    #[test]
    fn wall_blocks_acceleration_but_not_deceleration() {
        let mut fx = Fixture::new();
        fx.level = LevelGeometry::new(vec![Solid::aabb(Vec2::new(0.52, -5.0), Vec2::new(2.0, 5.0))]);
        let collider = BoxCollider::new(1.0, 1.8).with_offset(Vec2::new(-0.5, 0.0));
        let mut m = module();

        let ctx = MovementContext {
            collider: Some(&collider),
            ..fx.ctx(0.0)
        };
        // Pushing into the wall on the right: no acceleration.
        let v = m.process_movement(Vec2::ZERO, true, &walk_input(1.0), &ctx);
        assert!(approx_eq(v.x, 0.0));

        // Moving away from the wall still accelerates.
        let v = m.process_movement(Vec2::ZERO, true, &walk_input(-1.0), &ctx);
        assert!(v.x < 0.0);

        // Existing velocity toward the wall decays instead of being frozen.
        let v = m.process_movement(Vec2::new(2.0, 0.0), true, &walk_input(1.0), &ctx);
        assert!(v.x < 2.0 && v.x > 0.0);
    }
}
