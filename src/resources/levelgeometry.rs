//! Static level collision geometry.
//!
//! A level is a flat list of [`Solid`]s: axis-aligned boxes and right
//! triangle ramps. [`LevelGeometry`] answers the two kinds of query the
//! character pipeline needs:
//!
//! - shape casts through [`ShapeCaster`], used by the ground sensor and by
//!   movement modules (wall probes)
//! - swept box movement through [`LevelGeometry::move_and_collide`], used by
//!   the movement system to integrate bodies
//!
//! Y is up. A ramp occupies its bounding box below the diagonal:
//!
//! ```text
//!   rises: right          rises: left
//!         /|               |\
//!        / |               | \
//!       /__|               |__\
//! ```
//!
//! # JSON
//!
//! ```json
//! {
//!   "spawn": [2.0, 1.0],
//!   "solids": [
//!     { "shape": "box", "min": [0, -1], "max": [40, 0] },
//!     { "shape": "ramp", "min": [10, 0], "max": [14, 2], "rises": "right" }
//!   ]
//! }
//! ```

use std::ops::BitOr;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::boxcollider::BoxCollider;
use crate::resources::assets::{AssetError, read_text};

/// Overlaps shallower than this are treated as touching.
const CONTACT_EPSILON: f32 = 1e-4;

/// Longest step a cast advances before testing overlaps again.
const CAST_STEP: f32 = 0.01;

/// Extra penetration tolerated when stepping onto a ramp sideways.
const RAMP_STEP_TOLERANCE: f32 = 0.01;

/// How far below the feet a grounded body is pulled down onto a ramp.
const RAMP_SNAP_DISTANCE: f32 = 0.05;

/// Bitmask of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const NONE: Self = Self(0);
    pub const SOLID: Self = Self(1);
    pub const PLATFORM: Self = Self(1 << 1);
    pub const ALL: Self = Self(u32::MAX);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::SOLID
    }
}

impl BitOr for CollisionLayers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampRise {
    /// Surface climbs toward +x.
    Right,
    /// Surface climbs toward -x.
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SolidShape {
    #[serde(rename = "box")]
    Aabb { min: Vec2, max: Vec2 },
    Ramp { min: Vec2, max: Vec2, rises: RampRise },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    #[serde(flatten)]
    pub shape: SolidShape,
    #[serde(default)]
    pub layers: CollisionLayers,
}

/// Result of a successful [`ShapeCaster::box_cast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// Unit surface normal at the contact.
    pub normal: Vec2,
    /// Distance travelled before the contact.
    pub distance: f32,
    /// Approximate contact point.
    pub point: Vec2,
}

/// Shape-cast primitive offered by the physics collaborator.
pub trait ShapeCaster: Send + Sync {
    /// Sweep a box of `size` centered at `center` along `direction` for up to
    /// `distance`.
    ///
    /// With `distance <= 0` (or a zero direction) this is an overlap test and
    /// the hit with the most upward normal is returned. Otherwise solids the
    /// box already overlaps at the start are ignored and the first contact is
    /// returned, preferring the normal most opposed to `direction`.
    fn box_cast(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        distance: f32,
        mask: CollisionLayers,
    ) -> Option<CastHit>;
}

/// Outcome of [`LevelGeometry::move_and_collide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec2,
    pub velocity: Vec2,
    pub hit_wall: bool,
    pub landed: bool,
    pub hit_ceiling: bool,
}

fn boxes_overlap(a_min: Vec2, a_max: Vec2, b_min: Vec2, b_max: Vec2) -> bool {
    a_min.x < b_max.x - CONTACT_EPSILON
        && a_max.x > b_min.x + CONTACT_EPSILON
        && a_min.y < b_max.y - CONTACT_EPSILON
        && a_max.y > b_min.y + CONTACT_EPSILON
}

fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

impl Solid {
    pub fn aabb(min: Vec2, max: Vec2) -> Self {
        Self {
            shape: SolidShape::Aabb {
                min: min.min(max),
                max: min.max(max),
            },
            layers: CollisionLayers::SOLID,
        }
    }

    pub fn ramp(min: Vec2, max: Vec2, rises: RampRise) -> Self {
        Self {
            shape: SolidShape::Ramp {
                min: min.min(max),
                max: min.max(max),
                rises,
            },
            layers: CollisionLayers::SOLID,
        }
    }

    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self.shape {
            SolidShape::Aabb { min, max } | SolidShape::Ramp { min, max, .. } => (min, max),
        }
    }

    fn is_ramp(&self) -> bool {
        matches!(self.shape, SolidShape::Ramp { .. })
    }

    /// Height of a ramp's surface at `x`, clamped to its span.
    fn surface_y(min: Vec2, max: Vec2, rises: RampRise, x: f32) -> f32 {
        let width = (max.x - min.x).max(f32::EPSILON);
        let t = ((x - min.x) / width).clamp(0.0, 1.0);
        match rises {
            RampRise::Right => min.y + t * (max.y - min.y),
            RampRise::Left => max.y - t * (max.y - min.y),
        }
    }

    /// The bottom corner of a box that reaches deepest into a ramp.
    fn ramp_probe_x(min: Vec2, max: Vec2, rises: RampRise, box_min: Vec2, box_max: Vec2) -> f32 {
        match rises {
            RampRise::Right => box_max.x.min(max.x),
            RampRise::Left => box_min.x.max(min.x),
        }
    }

    /// How far the bottom of the box sits below the surface (negative when above).
    fn penetration_below_surface(&self, box_min: Vec2, box_max: Vec2) -> f32 {
        match self.shape {
            SolidShape::Aabb { max, .. } => max.y - box_min.y,
            SolidShape::Ramp { min, max, rises } => {
                let x = Self::ramp_probe_x(min, max, rises, box_min, box_max);
                Self::surface_y(min, max, rises, x) - box_min.y
            }
        }
    }

    fn overlaps_box(&self, box_min: Vec2, box_max: Vec2) -> bool {
        let (min, max) = self.bounds();
        if !boxes_overlap(box_min, box_max, min, max) {
            return false;
        }
        match self.shape {
            SolidShape::Aabb { .. } => true,
            SolidShape::Ramp { .. } => {
                self.penetration_below_surface(box_min, box_max) > CONTACT_EPSILON
            }
        }
    }

    /// Contact normal for a box already overlapping this solid.
    fn contact_normal(&self, box_min: Vec2, box_max: Vec2) -> Vec2 {
        let center = (box_min + box_max) * 0.5;
        match self.shape {
            SolidShape::Aabb { min, max } => {
                let solid_center = (min + max) * 0.5;
                let overlap_x = box_max.x.min(max.x) - box_min.x.max(min.x);
                let overlap_y = box_max.y.min(max.y) - box_min.y.max(min.y);
                if overlap_y <= overlap_x {
                    Vec2::new(0.0, sign_or_one(center.y - solid_center.y))
                } else {
                    Vec2::new(sign_or_one(center.x - solid_center.x), 0.0)
                }
            }
            SolidShape::Ramp { min, max, rises } => {
                let size = max - min;
                if center.y < min.y {
                    return Vec2::NEG_Y;
                }
                match rises {
                    RampRise::Right if center.x > max.x => Vec2::X,
                    RampRise::Left if center.x < min.x => Vec2::NEG_X,
                    RampRise::Right => Vec2::new(-size.y, size.x).try_normalize().unwrap_or(Vec2::Y),
                    RampRise::Left => Vec2::new(size.y, size.x).try_normalize().unwrap_or(Vec2::Y),
                }
            }
        }
    }
}

/// Static collision geometry of the loaded level.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    #[serde(default)]
    pub solids: Vec<Solid>,
    /// Where characters spawn when no position is given.
    #[serde(default)]
    pub spawn: Vec2,
}

impl LevelGeometry {
    pub fn new(solids: Vec<Solid>) -> Self {
        Self {
            solids,
            spawn: Vec2::ZERO,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let level = Self::from_json_str(&read_text(path)?)?;
        info!("Loaded level {:?}: {} solids", path, level.solids.len());
        Ok(level)
    }

    fn overlapping(
        &self,
        box_min: Vec2,
        box_max: Vec2,
        mask: CollisionLayers,
    ) -> impl Iterator<Item = &Solid> {
        self.solids
            .iter()
            .filter(move |s| s.layers.intersects(mask) && s.overlaps_box(box_min, box_max))
    }

    /// Move a collider by `velocity * dt`, one axis at a time, stopping at
    /// solids on `mask`.
    ///
    /// Ramps lift the body onto their surface. With `snap_to_ramps`, a body
    /// that ends the move slightly above a ramp is pulled down onto it so it
    /// stays grounded while walking downhill.
    pub fn move_and_collide(
        &self,
        collider: &BoxCollider,
        position: Vec2,
        velocity: Vec2,
        dt: f32,
        mask: CollisionLayers,
        snap_to_ramps: bool,
    ) -> MoveResult {
        let mut result = MoveResult {
            position,
            velocity,
            hit_wall: false,
            landed: false,
            hit_ceiling: false,
        };

        let dx = velocity.x * dt;
        if dx != 0.0 {
            result.position.x += dx;
            self.resolve_horizontal(collider, dx, mask, &mut result);
        }

        let dy = velocity.y * dt;
        result.position.y += dy;
        self.resolve_vertical(collider, dy, mask, &mut result);

        if snap_to_ramps && result.velocity.y <= 0.0 && !result.landed {
            self.snap_down(collider, mask, &mut result);
        }
        result
    }

    fn resolve_horizontal(
        &self,
        collider: &BoxCollider,
        dx: f32,
        mask: CollisionLayers,
        result: &mut MoveResult,
    ) {
        for solid in self.solids.iter().filter(|s| s.layers.intersects(mask)) {
            let (box_min, box_max) = collider.aabb(result.position);
            if !solid.overlaps_box(box_min, box_max) {
                continue;
            }
            if let SolidShape::Ramp { min, max, .. } = solid.shape {
                // Walking up the slope: the vertical pass lifts the body.
                let slope = (max.y - min.y) / (max.x - min.x).max(f32::EPSILON);
                let climb = dx.abs() * slope + RAMP_STEP_TOLERANCE;
                if solid.penetration_below_surface(box_min, box_max) <= climb {
                    continue;
                }
            }
            let (min, max) = solid.bounds();
            if dx > 0.0 {
                result.position.x -= box_max.x - min.x;
            } else {
                result.position.x += max.x - box_min.x;
            }
            result.velocity.x = 0.0;
            result.hit_wall = true;
        }
    }

    fn resolve_vertical(
        &self,
        collider: &BoxCollider,
        dy: f32,
        mask: CollisionLayers,
        result: &mut MoveResult,
    ) {
        for solid in self.solids.iter().filter(|s| s.layers.intersects(mask)) {
            let (box_min, box_max) = collider.aabb(result.position);
            if !solid.overlaps_box(box_min, box_max) {
                continue;
            }
            let (min, _) = solid.bounds();
            let from_below = dy > 0.0 && (!solid.is_ramp() || (box_min.y + box_max.y) * 0.5 < min.y);
            if from_below {
                result.position.y -= box_max.y - min.y;
                result.velocity.y = 0.0;
                result.hit_ceiling = true;
                continue;
            }
            result.position.y += solid.penetration_below_surface(box_min, box_max);
            if result.velocity.y <= 0.0 {
                result.velocity.y = 0.0;
                result.landed = true;
            }
        }
    }

    fn snap_down(&self, collider: &BoxCollider, mask: CollisionLayers, result: &mut MoveResult) {
        let (box_min, box_max) = collider.aabb(result.position);
        let probe_min = box_min - Vec2::new(0.0, RAMP_SNAP_DISTANCE);
        let gap = self
            .solids
            .iter()
            .filter(|s| s.is_ramp() && s.layers.intersects(mask))
            .filter(|s| s.overlaps_box(probe_min, box_max))
            .map(|s| -s.penetration_below_surface(box_min, box_max))
            .filter(|gap| *gap > 0.0 && *gap <= RAMP_SNAP_DISTANCE)
            .fold(None, |best: Option<f32>, gap| Some(best.map_or(gap, |b| b.min(gap))));
        if let Some(gap) = gap {
            result.position.y -= gap;
            result.velocity.y = 0.0;
            result.landed = true;
        }
    }
}

impl ShapeCaster for LevelGeometry {
    fn box_cast(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        distance: f32,
        mask: CollisionLayers,
    ) -> Option<CastHit> {
        let half = size.abs() * 0.5;
        let dir = direction.normalize_or_zero();

        if distance <= 0.0 || dir == Vec2::ZERO {
            let (box_min, box_max) = (center - half, center + half);
            return self
                .overlapping(box_min, box_max, mask)
                .map(|s| s.contact_normal(box_min, box_max))
                .max_by(|a, b| a.y.total_cmp(&b.y))
                .map(|normal| CastHit {
                    normal,
                    distance: 0.0,
                    point: center - normal * half,
                });
        }

        let start_min = center - half;
        let start_max = center + half;
        let end = center + dir * distance;
        let sweep_min = start_min.min(end - half);
        let sweep_max = start_max.max(end + half);
        let candidates: SmallVec<[&Solid; 8]> = self
            .solids
            .iter()
            .filter(|s| s.layers.intersects(mask))
            .filter(|s| {
                let (min, max) = s.bounds();
                boxes_overlap(sweep_min, sweep_max, min, max)
            })
            .filter(|s| !s.overlaps_box(start_min, start_max))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let steps = (distance / CAST_STEP).ceil().max(1.0) as usize;
        for i in 1..=steps {
            let travelled = distance * i as f32 / steps as f32;
            let c = center + dir * travelled;
            let (box_min, box_max) = (c - half, c + half);
            let best = candidates
                .iter()
                .filter(|s| s.overlaps_box(box_min, box_max))
                .map(|s| s.contact_normal(box_min, box_max))
                .min_by(|a, b| a.dot(dir).total_cmp(&b.dot(dir)));
            if let Some(normal) = best {
                return Some(CastHit {
                    normal,
                    distance: travelled,
                    point: c + dir * half,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn floor() -> Solid {
        Solid::aabb(Vec2::new(-50.0, -1.0), Vec2::new(50.0, 0.0))
    }

    fn body() -> BoxCollider {
        BoxCollider::new(1.0, 1.8).with_offset(Vec2::new(-0.5, 0.0))
    }

    #[test]
    fn overlap_on_flat_floor_points_up() {
        let level = LevelGeometry::new(vec![floor()]);
        let hit = level
            .box_cast(Vec2::ZERO, Vec2::new(0.9, 0.2), Vec2::NEG_Y, 0.0, CollisionLayers::SOLID)
            .expect("standing on the floor");
        assert_eq!(hit.normal, Vec2::Y);
    }

    #[test]
    fn overlap_ignores_other_layers() {
        let level = LevelGeometry::new(vec![floor().with_layers(CollisionLayers::PLATFORM)]);
        assert!(level
            .box_cast(Vec2::ZERO, Vec2::new(0.9, 0.2), Vec2::NEG_Y, 0.0, CollisionLayers::SOLID)
            .is_none());
    }

    #[test]
    fn overlap_on_ramp_reports_tilted_normal() {
        let level = LevelGeometry::new(vec![Solid::ramp(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            RampRise::Right,
        )]);
        let hit = level
            .box_cast(Vec2::new(2.0, 2.0), Vec2::new(0.9, 0.2), Vec2::NEG_Y, 0.0, CollisionLayers::SOLID)
            .expect("on the ramp");
        let expected = Vec2::new(-1.0, 1.0).normalize();
        assert!(approx_eq(hit.normal.x, expected.x));
        assert!(approx_eq(hit.normal.y, expected.y));
    }

    #[test]
    fn cast_finds_wall_and_ignores_starting_overlap() {
        let level = LevelGeometry::new(vec![
            floor(),
            Solid::aabb(Vec2::new(0.52, 0.0), Vec2::new(2.0, 5.0)),
        ]);
        // Box slightly sunk into the floor so it overlaps it at the start.
        let hit = level
            .box_cast(Vec2::new(0.0, 0.85), Vec2::new(1.0, 1.8), Vec2::X, 0.05, CollisionLayers::SOLID)
            .expect("wall ahead");
        assert_eq!(hit.normal, Vec2::NEG_X);
        assert!(hit.distance > 0.02 && hit.distance <= 0.05);
    }

    #[test]
    fn cast_misses_distant_wall() {
        let level = LevelGeometry::new(vec![Solid::aabb(Vec2::new(1.0, 0.0), Vec2::new(2.0, 5.0))]);
        assert!(level
            .box_cast(Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::X, 0.05, CollisionLayers::SOLID)
            .is_none());
    }

    #[test]
    fn falling_body_lands_on_floor() {
        let level = LevelGeometry::new(vec![floor()]);
        let r = level.move_and_collide(
            &body(),
            Vec2::new(0.0, 0.1),
            Vec2::new(0.0, -10.0),
            0.02,
            CollisionLayers::SOLID,
            false,
        );
        assert!(r.landed);
        assert!(approx_eq(r.position.y, 0.0));
        assert_eq!(r.velocity.y, 0.0);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let level = LevelGeometry::new(vec![Solid::aabb(Vec2::new(1.0, 0.0), Vec2::new(2.0, 5.0))]);
        let r = level.move_and_collide(
            &body(),
            Vec2::new(0.45, 1.0),
            Vec2::new(10.0, 0.0),
            0.02,
            CollisionLayers::SOLID,
            false,
        );
        assert!(r.hit_wall);
        assert!(approx_eq(r.position.x, 0.5));
        assert_eq!(r.velocity.x, 0.0);
    }

    #[test]
    fn ceiling_stops_ascent() {
        let level = LevelGeometry::new(vec![Solid::aabb(Vec2::new(-5.0, 2.0), Vec2::new(5.0, 3.0))]);
        let r = level.move_and_collide(
            &body(),
            Vec2::new(0.0, 0.15),
            Vec2::new(0.0, 5.0),
            0.02,
            CollisionLayers::SOLID,
            false,
        );
        assert!(r.hit_ceiling);
        assert!(approx_eq(r.position.y, 0.2));
        assert_eq!(r.velocity.y, 0.0);
    }

    #[test]
    fn walking_uphill_lifts_the_body() {
        let level = LevelGeometry::new(vec![
            floor(),
            Solid::ramp(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0), RampRise::Right),
        ]);
        // Bottom-right corner sits on the surface at x = 1.5, y = 0.75.
        let r = level.move_and_collide(
            &body(),
            Vec2::new(1.0, 0.75),
            Vec2::new(5.0, 0.0),
            0.02,
            CollisionLayers::SOLID,
            true,
        );
        assert!(!r.hit_wall);
        assert!(approx_eq(r.position.x, 1.1));
        assert!(approx_eq(r.position.y, 0.8));
    }

    #[test]
    fn tall_side_of_ramp_blocks() {
        let level = LevelGeometry::new(vec![Solid::ramp(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 2.0),
            RampRise::Right,
        )]);
        let r = level.move_and_collide(
            &body(),
            Vec2::new(4.55, 0.0),
            Vec2::new(-5.0, 0.0),
            0.02,
            CollisionLayers::SOLID,
            false,
        );
        assert!(r.hit_wall);
        assert!(approx_eq(r.position.x, 4.5));
    }

    #[test]
    fn walking_downhill_snaps_to_surface() {
        let level = LevelGeometry::new(vec![Solid::ramp(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 2.0),
            RampRise::Left,
        )]);
        // Bottom-left corner at x = 1.5 touches y = 1.25.
        let r = level.move_and_collide(
            &body(),
            Vec2::new(2.0, 1.25),
            Vec2::new(2.0, 0.0),
            0.02,
            CollisionLayers::SOLID,
            true,
        );
        assert!(r.landed);
        assert!(approx_eq(r.position.y, 1.23));

        let unsnapped = level.move_and_collide(
            &body(),
            Vec2::new(2.0, 1.25),
            Vec2::new(2.0, 0.0),
            0.02,
            CollisionLayers::SOLID,
            false,
        );
        assert!(approx_eq(unsnapped.position.y, 1.25));
    }

    #[test]
    fn parses_level_json() {
        let level = LevelGeometry::from_json_str(
            r#"{
                "spawn": [1.0, 2.0],
                "solids": [
                    { "shape": "box", "min": [0, -1], "max": [10, 0] },
                    { "shape": "ramp", "min": [2, 0], "max": [4, 1], "rises": "left", "layers": 2 }
                ]
            }"#,
        )
        .expect("valid level");
        assert_eq!(level.spawn, Vec2::new(1.0, 2.0));
        assert_eq!(level.solids.len(), 2);
        assert_eq!(level.solids[0].layers, CollisionLayers::SOLID);
        assert_eq!(level.solids[1].layers, CollisionLayers::PLATFORM);
        assert!(matches!(level.solids[1].shape, SolidShape::Ramp { rises: RampRise::Left, .. }));
    }
}
