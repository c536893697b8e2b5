//! Kinematic body integrated by the movement system.
//!
//! Ability modules never touch the body directly: the character controller
//! reads `velocity` before folding its movement modules and writes the result
//! back once per fixed tick. Gravity comes from
//! [`GameConfig`](crate::resources::gameconfig::GameConfig) and is scaled by
//! `gravity_scale`, which the controller keeps in sync with the derived stats.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Multiplier over world gravity. 0 disables gravity for this body.
    pub gravity_scale: f32,
    /// Downward speed limit, if any.
    pub max_fall_speed: Option<f32>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            max_fall_speed: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Apply `gravity * gravity_scale` for `dt` and clamp the fall.
    pub fn integrate_gravity(&mut self, gravity: f32, dt: f32) {
        self.velocity.y -= gravity * self.gravity_scale * dt;
        if let Some(max_fall) = self.max_fall_speed {
            self.velocity.y = self.velocity.y.max(-max_fall.abs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn gravity_is_scaled() {
        let mut rb = RigidBody::new();
        rb.gravity_scale = 0.5;
        rb.integrate_gravity(20.0, 0.1);
        assert!(approx_eq(rb.velocity.y, -1.0));
    }

    #[test]
    fn fall_speed_is_clamped() {
        let mut rb = RigidBody::new().with_velocity(Vec2::new(1.0, -9.5));
        rb.max_fall_speed = Some(10.0);
        rb.integrate_gravity(30.0, 0.1);
        assert!(approx_eq(rb.velocity.y, -10.0));
        assert!(approx_eq(rb.velocity.x, 1.0));
    }

    #[test]
    fn zero_scale_floats() {
        let mut rb = RigidBody::new().with_velocity(Vec2::new(0.0, 2.0));
        rb.gravity_scale = 0.0;
        rb.integrate_gravity(30.0, 0.5);
        assert!(approx_eq(rb.velocity.y, 2.0));
    }
}
