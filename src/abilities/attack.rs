//! Melee attack on a cooldown driven by `attack_speed`.

use super::{AbilityContext, AbilityEffect, AbilityModule, ModuleIdentity, ModuleInit, ModuleType, NEVER};
use crate::resources::input::InputSnapshot;

pub struct MeleeAttack {
    identity: ModuleIdentity,
    last_attack_time: f32,
}

impl MeleeAttack {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            last_attack_time: NEVER,
        }
    }
}

/// Seconds between swings. Zero or negative speed never attacks.
fn cooldown(attack_speed: f32) -> f32 {
    if attack_speed > 0.0 {
        1.0 / attack_speed
    } else {
        f32::INFINITY
    }
}

impl AbilityModule for MeleeAttack {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::MeleeAttack
    }

    fn initialize(&mut self, _init: &ModuleInit) {
        self.last_attack_time = NEVER;
    }

    fn process_ability(&mut self, input: &InputSnapshot, ctx: &mut AbilityContext<'_>) {
        if !input.attack.just_pressed {
            return;
        }
        if ctx.now - self.last_attack_time < cooldown(ctx.stats.attack_speed) {
            return;
        }
        self.last_attack_time = ctx.now;
        ctx.effects.push(AbilityEffect::Attack {
            damage: ctx.stats.attack_damage,
            range: ctx.stats.attack_range,
            facing: ctx.facing,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::testing::tapped;
    use crate::components::groundsensor::GroundState;
    use crate::stats::StatStore;

    fn attack_at(m: &mut MeleeAttack, stats: &StatStore, now: f32) -> Vec<AbilityEffect> {
        let ground = GroundState::default();
        let mut effects = Vec::new();
        let input = InputSnapshot {
            attack: tapped(),
            ..InputSnapshot::default()
        };
        let mut ctx = AbilityContext {
            stats,
            ground: &ground,
            now,
            dt: 0.016,
            facing: -1.0,
            effects: &mut effects,
        };
        m.process_ability(&input, &mut ctx);
        effects
    }

    #[test]
    fn attacks_respect_cooldown() {
        let stats = StatStore {
            attack_speed: 2.0,
            attack_damage: 3.0,
            attack_range: 1.25,
            ..StatStore::default()
        };
        let mut m = MeleeAttack::new(ModuleIdentity::new("slash", "Slash"));

        let effects = attack_at(&mut m, &stats, 1.0);
        assert_eq!(
            effects,
            vec![AbilityEffect::Attack {
                damage: 3.0,
                range: 1.25,
                facing: -1.0
            }]
        );
        assert!(attack_at(&mut m, &stats, 1.2).is_empty());
        assert_eq!(attack_at(&mut m, &stats, 1.5).len(), 1);
    }

    #[test]
    fn zero_attack_speed_never_attacks() {
        let stats = StatStore {
            attack_speed: 0.0,
            ..StatStore::default()
        };
        let mut m = MeleeAttack::new(ModuleIdentity::new("slash", "Slash"));
        assert!(attack_at(&mut m, &stats, 5.0).is_empty());
    }
}
