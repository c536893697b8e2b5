//! Designer data for ability modules.
//!
//! An [`AbilityModuleDef`] is the serialized form of one module inside an
//! ability set: identity, duplicate policy, self-declared stat modifiers and
//! a [`ModuleKind`] carrying per-type tuning. Equipping a set turns each
//! definition into a live instance with [`AbilityModuleDef::instantiate`].
//!
//! ```json
//! {
//!   "ability_id": "walk",
//!   "display_name": "Walk",
//!   "modifiers": [ { "stat": "walk_speed", "op": "multiplicative", "value": 1.2 } ],
//!   "kind": { "type": "horizontal_move", "run_deadzone": 0.1 }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::attack::MeleeAttack;
use super::crouch::Crouch;
use super::double_jump::DoubleJump;
use super::fly::{Fly, FlyConfig};
use super::horizontal_move::{HorizontalMove, HorizontalMoveConfig};
use super::inhale::Inhale;
use super::jump::Jump;
use super::{AbilityModule, ModuleIdentity, MovementModule};
use crate::stats::StatModifier;

/// Concrete module type, used for the duplicate-module policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleType {
    HorizontalMove,
    Jump,
    DoubleJump,
    Fly,
    Crouch,
    MeleeAttack,
    Inhale,
}

impl ModuleType {
    pub const ALL: [ModuleType; 7] = [
        ModuleType::HorizontalMove,
        ModuleType::Jump,
        ModuleType::DoubleJump,
        ModuleType::Fly,
        ModuleType::Crouch,
        ModuleType::MeleeAttack,
        ModuleType::Inhale,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModuleType::HorizontalMove => "horizontal_move",
            ModuleType::Jump => "jump",
            ModuleType::DoubleJump => "double_jump",
            ModuleType::Fly => "fly",
            ModuleType::Crouch => "crouch",
            ModuleType::MeleeAttack => "melee_attack",
            ModuleType::Inhale => "inhale",
        }
    }

    pub fn from_name(name: &str) -> Option<ModuleType> {
        ModuleType::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn is_movement(self) -> bool {
        matches!(
            self,
            ModuleType::HorizontalMove
                | ModuleType::Jump
                | ModuleType::DoubleJump
                | ModuleType::Fly
                | ModuleType::Crouch
        )
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleKind {
    HorizontalMove(HorizontalMoveConfig),
    Jump,
    DoubleJump,
    Fly(FlyConfig),
    Crouch,
    MeleeAttack,
    Inhale,
}

impl ModuleKind {
    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleKind::HorizontalMove(_) => ModuleType::HorizontalMove,
            ModuleKind::Jump => ModuleType::Jump,
            ModuleKind::DoubleJump => ModuleType::DoubleJump,
            ModuleKind::Fly(_) => ModuleType::Fly,
            ModuleKind::Crouch => ModuleType::Crouch,
            ModuleKind::MeleeAttack => ModuleType::MeleeAttack,
            ModuleKind::Inhale => ModuleType::Inhale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AbilityModuleDefAsset")]
pub struct AbilityModuleDef {
    pub ability_id: String,
    pub display_name: String,
    pub allow_multiple_instances: bool,
    pub modifiers: Vec<StatModifier>,
    pub kind: ModuleKind,
}

/// Serialized shape. A missing or empty display name falls back to the id,
/// as with [`AbilityModuleDef::new`].
#[derive(Deserialize)]
struct AbilityModuleDefAsset {
    ability_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    allow_multiple_instances: bool,
    #[serde(default)]
    modifiers: Vec<StatModifier>,
    kind: ModuleKind,
}

impl From<AbilityModuleDefAsset> for AbilityModuleDef {
    fn from(asset: AbilityModuleDefAsset) -> Self {
        let mut def = AbilityModuleDef::new(asset.ability_id, asset.kind);
        if let Some(name) = asset.display_name.filter(|n| !n.is_empty()) {
            def.display_name = name;
        }
        def.allow_multiple_instances = asset.allow_multiple_instances;
        def.modifiers = asset.modifiers;
        def
    }
}

/// A live module, already sorted into its capability.
pub enum ModuleInstance {
    Movement(Box<dyn MovementModule>),
    Other(Box<dyn AbilityModule>),
}

impl AbilityModuleDef {
    pub fn new(ability_id: impl Into<String>, kind: ModuleKind) -> Self {
        let ability_id = ability_id.into();
        Self {
            display_name: ability_id.clone(),
            ability_id,
            allow_multiple_instances: false,
            modifiers: Vec::new(),
            kind,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn allowing_multiple(mut self) -> Self {
        self.allow_multiple_instances = true;
        self
    }

    pub fn module_type(&self) -> ModuleType {
        self.kind.module_type()
    }

    pub fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::new(self.ability_id.clone(), self.display_name.clone())
    }

    pub fn instantiate(&self) -> ModuleInstance {
        let identity = self.identity();
        match &self.kind {
            ModuleKind::HorizontalMove(config) => {
                ModuleInstance::Movement(Box::new(HorizontalMove::new(identity, config.clone())))
            }
            ModuleKind::Jump => ModuleInstance::Movement(Box::new(Jump::new(identity))),
            ModuleKind::DoubleJump => ModuleInstance::Movement(Box::new(DoubleJump::new(identity))),
            ModuleKind::Fly(config) => ModuleInstance::Movement(Box::new(Fly::new(identity, *config))),
            ModuleKind::Crouch => ModuleInstance::Movement(Box::new(Crouch::new(identity))),
            ModuleKind::MeleeAttack => ModuleInstance::Other(Box::new(MeleeAttack::new(identity))),
            ModuleKind::Inhale => ModuleInstance::Other(Box::new(Inhale::new(identity))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatId;

    #[test]
    fn instantiate_sorts_by_capability() {
        for ty in ModuleType::ALL {
            let kind = match ty {
                ModuleType::HorizontalMove => ModuleKind::HorizontalMove(HorizontalMoveConfig::default()),
                ModuleType::Jump => ModuleKind::Jump,
                ModuleType::DoubleJump => ModuleKind::DoubleJump,
                ModuleType::Fly => ModuleKind::Fly(FlyConfig::default()),
                ModuleType::Crouch => ModuleKind::Crouch,
                ModuleType::MeleeAttack => ModuleKind::MeleeAttack,
                ModuleType::Inhale => ModuleKind::Inhale,
            };
            let def = AbilityModuleDef::new(ty.name(), kind);
            match def.instantiate() {
                ModuleInstance::Movement(m) => {
                    assert!(ty.is_movement());
                    assert_eq!(m.module_type(), ty);
                }
                ModuleInstance::Other(m) => {
                    assert!(!ty.is_movement());
                    assert_eq!(m.module_type(), ty);
                }
            }
        }
    }

    #[test]
    fn json_definition_with_defaults() {
        let def: AbilityModuleDef = serde_json::from_str(
            r#"{
                "ability_id": "walk",
                "modifiers": [ { "stat": "walk_speed", "op": "additive", "value": 1.0 } ],
                "kind": { "type": "horizontal_move" }
            }"#,
        )
        .unwrap();
        assert_eq!(def.module_type(), ModuleType::HorizontalMove);
        assert_eq!(def.display_name, "walk");
        assert!(!def.allow_multiple_instances);
        assert_eq!(def.modifiers[0].stat, StatId::WalkSpeed);
        assert_eq!(def.kind, ModuleKind::HorizontalMove(HorizontalMoveConfig::default()));
    }

    #[test]
    fn unit_kinds_parse_from_tag_only() {
        let def: AbilityModuleDef =
            serde_json::from_str(r#"{ "ability_id": "hop", "kind": { "type": "jump" } }"#).unwrap();
        assert_eq!(def.kind, ModuleKind::Jump);
    }

    #[test]
    fn type_names_round_trip() {
        for ty in ModuleType::ALL {
            assert_eq!(ModuleType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ModuleType::from_name("teleport"), None);
    }
}
