//! Ground contact sensing and slope classification.
//!
//! Each fixed tick a small box at the character's feet is overlap-tested
//! against the level. The result is a fresh [`GroundState`]; nothing is
//! carried over from the previous tick.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::resources::levelgeometry::{CollisionLayers, ShapeCaster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeClass {
    #[default]
    None,
    Flat,
    Slope,
    DeepSlope,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundState {
    pub is_grounded: bool,
    /// Unit contact normal. Up when airborne.
    pub ground_normal: Vec2,
    /// Signed degrees. Positive when the ground rises to the right.
    pub slope_angle: f32,
    pub slope_class: SlopeClass,
}

impl Default for GroundState {
    fn default() -> Self {
        Self::airborne()
    }
}

impl GroundState {
    pub fn airborne() -> Self {
        Self {
            is_grounded: false,
            ground_normal: Vec2::Y,
            slope_angle: 0.0,
            slope_class: SlopeClass::None,
        }
    }

    /// Grounded state for a contact with `normal`.
    pub fn from_contact(normal: Vec2, config: &GroundSensorConfig) -> Self {
        let slope_angle = slope_angle_from_normal(normal);
        Self {
            is_grounded: true,
            ground_normal: normal,
            slope_angle,
            slope_class: classify_slope(
                slope_angle,
                config.slope_threshold,
                config.deep_slope_threshold,
            ),
        }
    }
}

/// Angle between `normal` and up, in degrees, signed by `-normal.x`.
pub fn slope_angle_from_normal(normal: Vec2) -> f32 {
    let angle = normal.dot(Vec2::Y).clamp(-1.0, 1.0).acos().to_degrees();
    if -normal.x < 0.0 { -angle } else { angle }
}

/// Bucket an angle by its magnitude.
///
/// `|angle| <= slope_threshold` is flat, below `deep_slope_threshold` is a
/// slope, anything else is a deep slope.
pub fn classify_slope(angle: f32, slope_threshold: f32, deep_slope_threshold: f32) -> SlopeClass {
    let magnitude = angle.abs();
    if magnitude <= slope_threshold {
        SlopeClass::Flat
    } else if magnitude < deep_slope_threshold {
        SlopeClass::Slope
    } else {
        SlopeClass::DeepSlope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSensorConfig {
    pub box_size: Vec2,
    /// Sensor center relative to the entity pivot.
    pub offset: Vec2,
    pub layer_mask: CollisionLayers,
    /// Degrees.
    pub slope_threshold: f32,
    /// Degrees.
    pub deep_slope_threshold: f32,
}

impl Default for GroundSensorConfig {
    fn default() -> Self {
        Self {
            box_size: Vec2::new(0.9, 0.2),
            offset: Vec2::ZERO,
            layer_mask: CollisionLayers::SOLID,
            slope_threshold: 5.0,
            deep_slope_threshold: 45.0,
        }
    }
}

/// Feet sensor of a character.
#[derive(Component, Debug, Clone, Default)]
pub struct GroundSensor {
    pub config: GroundSensorConfig,
    state: GroundState,
}

impl GroundSensor {
    pub fn new(config: GroundSensorConfig) -> Self {
        Self {
            config,
            state: GroundState::airborne(),
        }
    }

    pub fn state(&self) -> &GroundState {
        &self.state
    }

    /// Recompute the ground state at `position` from a single overlap cast.
    pub fn sense(&mut self, position: Vec2, caster: &dyn ShapeCaster) -> &GroundState {
        let hit = caster.box_cast(
            position + self.config.offset,
            self.config.box_size,
            Vec2::NEG_Y,
            0.0,
            self.config.layer_mask,
        );
        self.state = match hit {
            Some(hit) => GroundState::from_contact(hit.normal, &self.config),
            None => GroundState::airborne(),
        };
        &self.state
    }
}
