//! Named numeric attribute container.
//!
//! [`StatStore`] keeps one plain `f32` field per [`StatId`]. Identifiers are
//! mapped to fields through [`STAT_BINDINGS`], a static table of accessor
//! pairs, so there is no runtime type inspection anywhere. Adding a stat means
//! adding a variant, a field and a binding entry.
//!
//! Lookups never fail hard. An identifier without a binding (or an unknown
//! stat name coming from designer data) logs a warning and reads as
//! [`UNBOUND_STAT_VALUE`].

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::resources::assets::AssetError;

/// Value returned when a stat has no backing field.
pub const UNBOUND_STAT_VALUE: f32 = 1.0;

/// Every stat the ability system knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatId {
    WalkSpeed,
    RunSpeed,
    GroundAcceleration,
    GroundDeceleration,
    AirAcceleration,
    AirDeceleration,
    JumpVelocity,
    JumpReleaseVelocityMultiplier,
    MaxFallSpeed,
    CoyoteTime,
    JumpBufferTime,
    GravityScale,
    FlapImpulse,
    FloatDescentSpeed,
    AttackDamage,
    AttackRange,
    AttackSpeed,
    InhaleRange,
    InhalePower,
}

impl StatId {
    pub const ALL: [StatId; 19] = [
        StatId::WalkSpeed,
        StatId::RunSpeed,
        StatId::GroundAcceleration,
        StatId::GroundDeceleration,
        StatId::AirAcceleration,
        StatId::AirDeceleration,
        StatId::JumpVelocity,
        StatId::JumpReleaseVelocityMultiplier,
        StatId::MaxFallSpeed,
        StatId::CoyoteTime,
        StatId::JumpBufferTime,
        StatId::GravityScale,
        StatId::FlapImpulse,
        StatId::FloatDescentSpeed,
        StatId::AttackDamage,
        StatId::AttackRange,
        StatId::AttackSpeed,
        StatId::InhaleRange,
        StatId::InhalePower,
    ];

    /// Snake case name used in JSON and INI data.
    pub fn name(self) -> &'static str {
        match self {
            StatId::WalkSpeed => "walk_speed",
            StatId::RunSpeed => "run_speed",
            StatId::GroundAcceleration => "ground_acceleration",
            StatId::GroundDeceleration => "ground_deceleration",
            StatId::AirAcceleration => "air_acceleration",
            StatId::AirDeceleration => "air_deceleration",
            StatId::JumpVelocity => "jump_velocity",
            StatId::JumpReleaseVelocityMultiplier => "jump_release_velocity_multiplier",
            StatId::MaxFallSpeed => "max_fall_speed",
            StatId::CoyoteTime => "coyote_time",
            StatId::JumpBufferTime => "jump_buffer_time",
            StatId::GravityScale => "gravity_scale",
            StatId::FlapImpulse => "flap_impulse",
            StatId::FloatDescentSpeed => "float_descent_speed",
            StatId::AttackDamage => "attack_damage",
            StatId::AttackRange => "attack_range",
            StatId::AttackSpeed => "attack_speed",
            StatId::InhaleRange => "inhale_range",
            StatId::InhalePower => "inhale_power",
        }
    }

    pub fn from_name(name: &str) -> Option<StatId> {
        StatId::ALL.iter().copied().find(|id| id.name() == name)
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accessor pair binding one [`StatId`] to one [`StatStore`] field.
pub struct StatBinding {
    pub id: StatId,
    pub get: fn(&StatStore) -> f32,
    pub set: fn(&mut StatStore, f32),
}

macro_rules! bind {
    ($id:ident, $field:ident) => {
        StatBinding {
            id: StatId::$id,
            get: |s| s.$field,
            set: |s, v| s.$field = v,
        }
    };
}

/// Identifier to field table. One entry per [`StatId`].
pub static STAT_BINDINGS: &[StatBinding] = &[
    bind!(WalkSpeed, walk_speed),
    bind!(RunSpeed, run_speed),
    bind!(GroundAcceleration, ground_acceleration),
    bind!(GroundDeceleration, ground_deceleration),
    bind!(AirAcceleration, air_acceleration),
    bind!(AirDeceleration, air_deceleration),
    bind!(JumpVelocity, jump_velocity),
    bind!(JumpReleaseVelocityMultiplier, jump_release_velocity_multiplier),
    bind!(MaxFallSpeed, max_fall_speed),
    bind!(CoyoteTime, coyote_time),
    bind!(JumpBufferTime, jump_buffer_time),
    bind!(GravityScale, gravity_scale),
    bind!(FlapImpulse, flap_impulse),
    bind!(FloatDescentSpeed, float_descent_speed),
    bind!(AttackDamage, attack_damage),
    bind!(AttackRange, attack_range),
    bind!(AttackSpeed, attack_speed),
    bind!(InhaleRange, inhale_range),
    bind!(InhalePower, inhale_power),
];

static BINDING_INDEX: LazyLock<FxHashMap<StatId, usize>> = LazyLock::new(|| {
    STAT_BINDINGS
        .iter()
        .enumerate()
        .map(|(index, binding)| (binding.id, index))
        .collect()
});

fn binding(id: StatId) -> Option<&'static StatBinding> {
    BINDING_INDEX.get(&id).map(|&index| &STAT_BINDINGS[index])
}

/// Numeric attributes of one character.
///
/// Units are world units and seconds. Missing fields in JSON keep their
/// default so older stat files keep loading after new stats are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatStore {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub ground_acceleration: f32,
    pub ground_deceleration: f32,
    pub air_acceleration: f32,
    pub air_deceleration: f32,
    pub jump_velocity: f32,
    /// Applied to upward velocity every fixed tick the jump button is not held.
    pub jump_release_velocity_multiplier: f32,
    pub max_fall_speed: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub gravity_scale: f32,
    pub flap_impulse: f32,
    /// Multiplier applied to falling velocity while floating.
    pub float_descent_speed: f32,
    pub attack_damage: f32,
    pub attack_range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    pub inhale_range: f32,
    pub inhale_power: f32,
}

impl Default for StatStore {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 7.0,
            ground_acceleration: 50.0,
            ground_deceleration: 60.0,
            air_acceleration: 30.0,
            air_deceleration: 20.0,
            jump_velocity: 12.0,
            jump_release_velocity_multiplier: 0.5,
            max_fall_speed: 20.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            gravity_scale: 1.0,
            flap_impulse: 6.0,
            float_descent_speed: 0.9,
            attack_damage: 1.0,
            attack_range: 1.5,
            attack_speed: 2.0,
            inhale_range: 3.0,
            inhale_power: 10.0,
        }
    }
}

impl StatStore {
    /// Read a stat. Unbound identifiers read as [`UNBOUND_STAT_VALUE`].
    pub fn get(&self, id: StatId) -> f32 {
        match binding(id) {
            Some(b) => (b.get)(self),
            None => {
                warn!("Stat '{}' has no binding, using {}", id, UNBOUND_STAT_VALUE);
                UNBOUND_STAT_VALUE
            }
        }
    }

    /// Write a stat. Unbound identifiers are ignored.
    pub fn set(&mut self, id: StatId, value: f32) {
        match binding(id) {
            Some(b) => (b.set)(self, value),
            None => warn!("Stat '{}' has no binding, ignoring write of {}", id, value),
        }
    }

    /// Read a stat by its data name.
    pub fn get_named(&self, name: &str) -> f32 {
        match StatId::from_name(name) {
            Some(id) => self.get(id),
            None => {
                warn!("Unknown stat '{}', using {}", name, UNBOUND_STAT_VALUE);
                UNBOUND_STAT_VALUE
            }
        }
    }

    /// Write a stat by its data name. Unknown names are ignored.
    pub fn set_named(&mut self, name: &str, value: f32) {
        match StatId::from_name(name) {
            Some(id) => self.set(id, value),
            None => warn!("Unknown stat '{}', ignoring write of {}", name, value),
        }
    }

    /// Parse a stat asset. Keys that name no stat are logged and skipped.
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        for name in unknown_stat_names(&value) {
            warn!("Unknown stat '{}' in stat asset, ignoring it", name);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Load a base stat asset, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No base stats asset configured, using default stats");
            return Self::default();
        };
        match Self::load(path) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Base stats '{}' unusable ({}), using default stats", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Top-level keys of a stat asset that are not stat names.
fn unknown_stat_names(value: &serde_json::Value) -> Vec<&str> {
    value
        .as_object()
        .map(|fields| {
            fields
                .keys()
                .map(String::as_str)
                .filter(|name| StatId::from_name(name).is_none())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stat_has_exactly_one_binding() {
        for id in StatId::ALL {
            let count = STAT_BINDINGS.iter().filter(|b| b.id == id).count();
            assert_eq!(count, 1, "{} bound {} times", id, count);
        }
        assert_eq!(STAT_BINDINGS.len(), StatId::ALL.len());
    }

    #[test]
    fn bindings_point_at_distinct_fields() {
        let mut stats = StatStore::default();
        for (i, id) in StatId::ALL.iter().enumerate() {
            stats.set(*id, 100.0 + i as f32);
        }
        for (i, id) in StatId::ALL.iter().enumerate() {
            assert_eq!(stats.get(*id), 100.0 + i as f32);
        }
    }

    #[test]
    fn get_and_set_by_id() {
        let mut stats = StatStore::default();
        stats.set(StatId::JumpVelocity, 15.5);
        assert_eq!(stats.jump_velocity, 15.5);
        assert_eq!(stats.get(StatId::JumpVelocity), 15.5);
    }

    #[test]
    fn unknown_name_reads_one_and_ignores_writes() {
        let mut stats = StatStore::default();
        let before = stats.clone();
        assert_eq!(stats.get_named("mana_regen"), UNBOUND_STAT_VALUE);
        stats.set_named("mana_regen", 42.0);
        assert_eq!(stats, before);
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for id in StatId::ALL {
            assert_eq!(StatId::from_name(id.name()), Some(id));
        }
    }

    #[test]
    fn json_missing_fields_keep_defaults() {
        let stats = StatStore::from_json_str(r#"{ "walk_speed": 4.0, "ground_acceleration": 50.0 }"#)
            .unwrap();
        assert_eq!(stats.walk_speed, 4.0);
        assert_eq!(stats.ground_acceleration, 50.0);
        assert_eq!(stats.jump_velocity, StatStore::default().jump_velocity);
    }

    #[test]
    fn unknown_keys_are_reported_and_skipped() {
        let json = r#"{ "walk_speed": 5.0, "mana_regen": 2.0, "jump_velocity": 9.0 }"#;
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(unknown_stat_names(&value), vec!["mana_regen"]);

        let stats = StatStore::from_json_str(json).unwrap();
        assert_eq!(stats.walk_speed, 5.0);
        assert_eq!(stats.jump_velocity, 9.0);
        assert_eq!(stats.run_speed, StatStore::default().run_speed);
    }

    #[test]
    fn missing_asset_falls_back_to_default() {
        let stats = StatStore::load_or_default(Some(Path::new("/nonexistent/stats.json")));
        assert_eq!(stats, StatStore::default());
        assert_eq!(StatStore::load_or_default(None), StatStore::default());
    }
}
