//! Stat modifiers and their ordered composition.
//!
//! A [`StatModifier`] is an immutable `(stat, op, value)` triple. Combining a
//! base value with several modifiers is a left fold in the order the
//! modifiers are given; the order is part of the contract:
//!
//! ```
//! use abilitykit::stats::{combine_modifiers, StatModifier, StatId};
//!
//! let add = StatModifier::additive(StatId::WalkSpeed, 2.0);
//! let mul = StatModifier::multiplicative(StatId::WalkSpeed, 2.0);
//! assert_eq!(combine_modifiers(1.0, [&add, &mul]), 6.0);
//! assert_eq!(combine_modifiers(1.0, [&mul, &add]), 4.0);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::store::{StatId, StatStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOp {
    Additive,
    Multiplicative,
    /// Replaces the running value at its position in the fold.
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatId,
    pub op: ModifierOp,
    pub value: f32,
}

impl StatModifier {
    pub fn new(stat: StatId, op: ModifierOp, value: f32) -> Self {
        Self { stat, op, value }
    }

    pub fn additive(stat: StatId, value: f32) -> Self {
        Self::new(stat, ModifierOp::Additive, value)
    }

    pub fn multiplicative(stat: StatId, value: f32) -> Self {
        Self::new(stat, ModifierOp::Multiplicative, value)
    }

    pub fn override_with(stat: StatId, value: f32) -> Self {
        Self::new(stat, ModifierOp::Override, value)
    }
}

pub fn apply_modifier(base: f32, value: f32, op: ModifierOp) -> f32 {
    match op {
        ModifierOp::Additive => base + value,
        ModifierOp::Multiplicative => base * value,
        ModifierOp::Override => value,
    }
}

/// Fold `modifiers` over `base` left to right.
///
/// The modifiers' `stat` field is not inspected; callers group by stat first.
pub fn combine_modifiers<'a>(base: f32, modifiers: impl IntoIterator<Item = &'a StatModifier>) -> f32 {
    modifiers
        .into_iter()
        .fold(base, |acc, m| apply_modifier(acc, m.value, m.op))
}

/// Modifiers of a single stat, in declaration order.
pub type ModifierGroup<'a> = SmallVec<[&'a StatModifier; 4]>;

/// Group modifiers by stat, keeping declaration order inside each group and
/// first-appearance order between groups.
pub fn group_by_stat(modifiers: &[StatModifier]) -> SmallVec<[(StatId, ModifierGroup<'_>); 4]> {
    let mut groups: SmallVec<[(StatId, ModifierGroup<'_>); 4]> = SmallVec::new();
    for modifier in modifiers {
        match groups.iter_mut().find(|(stat, _)| *stat == modifier.stat) {
            Some((_, group)) => group.push(modifier),
            None => {
                let mut group = ModifierGroup::new();
                group.push(modifier);
                groups.push((modifier.stat, group));
            }
        }
    }
    groups
}

/// Apply `modifiers` to `stats` one stat group at a time.
///
/// Stats without modifiers are left exactly as they were.
pub fn apply_grouped(stats: &mut StatStore, modifiers: &[StatModifier]) {
    for (stat, group) in group_by_stat(modifiers) {
        let value = combine_modifiers(stats.get(stat), group.iter().copied());
        stats.set(stat, value);
    }
}
