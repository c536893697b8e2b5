//! Ability sets: ordered module loadouts plus global stat modifiers.
//!
//! An [`AbilitySet`] is authored once (JSON asset or builder) and is
//! immutable at use time. Controllers share it through an `Arc` and only
//! ever read it to instantiate modules and derive stats.
//!
//! # Stat derivation
//!
//! [`AbilitySet::derive_stats`] layers modifiers over a copy of the base
//! stats:
//!
//! 1. global modifiers, grouped by stat, each group folded in declaration order
//! 2. each module's own modifiers, module by module in list order, same rule
//!
//! Later layers see the values produced by earlier ones. Stats that no
//! modifier mentions keep the exact base value.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definition::{AbilityModuleDef, ModuleKind, ModuleType};
use crate::resources::assets::AssetError;
use crate::stats::modifier::apply_grouped;
use crate::stats::{StatModifier, StatStore};

/// Outcome of adding (or checking) a module against a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddModuleResult {
    Success,
    /// A module of the same type is present and does not allow copies.
    DuplicateNotAllowed,
    /// The named type is not an ability module.
    InvalidAbility,
}

/// Raw serialized shape.
///
/// Modules and modifiers stay as JSON values until [`AbilitySet`] checks
/// them one by one, so a stale entry in designer data costs only that entry.
#[derive(Debug, Clone, Deserialize)]
struct AbilitySetAsset {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    modules: Vec<Value>,
    #[serde(default)]
    global_modifiers: Vec<Value>,
}

/// One module entry with its type and modifiers not yet validated.
#[derive(Deserialize)]
struct ModuleEntry {
    ability_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    allow_multiple_instances: bool,
    #[serde(default)]
    modifiers: Vec<Value>,
    kind: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AbilitySetAsset")]
pub struct AbilitySet {
    pub id: String,
    pub display_name: String,
    modules: Vec<AbilityModuleDef>,
    pub global_modifiers: Vec<StatModifier>,
}

impl From<AbilitySetAsset> for AbilitySet {
    fn from(asset: AbilitySetAsset) -> Self {
        let mut set = AbilitySet::new(asset.id);
        if let Some(name) = asset.display_name.filter(|n| !n.is_empty()) {
            set.display_name = name;
        }
        set.global_modifiers = parse_modifiers(asset.global_modifiers, &set.id, "global");
        for value in asset.modules {
            if let Some(def) = set.module_from_value(value) {
                set.add_module(def);
            }
        }
        set
    }
}

/// Keep the modifiers that parse; log and drop the rest.
fn parse_modifiers(values: Vec<Value>, set_id: &str, owner: &str) -> Vec<StatModifier> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<StatModifier>(value) {
            Ok(modifier) => Some(modifier),
            Err(e) => {
                warn!("Ability set '{}': dropping {} modifier ({})", set_id, owner, e);
                None
            }
        })
        .collect()
}

impl AbilitySet {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            modules: Vec::new(),
            global_modifiers: Vec::new(),
        }
    }

    pub fn with_global_modifier(mut self, modifier: StatModifier) -> Self {
        self.global_modifiers.push(modifier);
        self
    }

    /// Builder form of [`AbilitySet::add_module`]. Rejected modules are logged.
    pub fn with_module(mut self, def: AbilityModuleDef) -> Self {
        let ability_id = def.ability_id.clone();
        let result = self.add_module(def);
        if result != AddModuleResult::Success {
            warn!("Ability set '{}': module '{}' rejected ({:?})", self.id, ability_id, result);
        }
        self
    }

    pub fn modules(&self) -> &[AbilityModuleDef] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn can_add_module(&self, module_type: ModuleType) -> AddModuleResult {
        let blocked = self
            .modules
            .iter()
            .any(|m| m.module_type() == module_type && !m.allow_multiple_instances);
        if blocked {
            AddModuleResult::DuplicateNotAllowed
        } else {
            AddModuleResult::Success
        }
    }

    /// Same as [`AbilitySet::can_add_module`] for a type named in data.
    pub fn can_add_module_named(&self, type_name: &str) -> AddModuleResult {
        match ModuleType::from_name(type_name) {
            Some(module_type) => self.can_add_module(module_type),
            None => AddModuleResult::InvalidAbility,
        }
    }

    /// Append a module. The set is unchanged unless the result is `Success`.
    pub fn add_module(&mut self, def: AbilityModuleDef) -> AddModuleResult {
        let result = self.can_add_module(def.module_type());
        if result == AddModuleResult::Success {
            self.modules.push(def);
        }
        result
    }

    /// Validate one serialized module against this set.
    ///
    /// Malformed entries, unknown types and duplicates are logged and
    /// yield `None`.
    fn module_from_value(&self, value: Value) -> Option<AbilityModuleDef> {
        let entry: ModuleEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ability set '{}': dropping malformed module ({})", self.id, e);
                return None;
            }
        };
        let type_name = entry.kind.get("type").and_then(Value::as_str).unwrap_or_default();
        let result = self.can_add_module_named(type_name);
        if result != AddModuleResult::Success {
            warn!(
                "Ability set '{}': dropping module '{}' of type '{}' ({:?})",
                self.id, entry.ability_id, type_name, result
            );
            return None;
        }
        let kind: ModuleKind = match serde_json::from_value(entry.kind) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(
                    "Ability set '{}': dropping module '{}', bad settings ({})",
                    self.id, entry.ability_id, e
                );
                return None;
            }
        };

        let modifiers = parse_modifiers(entry.modifiers, &self.id, &entry.ability_id);
        let mut def = AbilityModuleDef::new(entry.ability_id, kind);
        if let Some(name) = entry.display_name.filter(|n| !n.is_empty()) {
            def.display_name = name;
        }
        def.allow_multiple_instances = entry.allow_multiple_instances;
        def.modifiers = modifiers;
        Some(def)
    }

    /// Build the stats a character has while this set is equipped.
    pub fn derive_stats(&self, base: &StatStore) -> StatStore {
        let mut derived = base.clone();
        apply_grouped(&mut derived, &self.global_modifiers);
        for module in &self.modules {
            apply_grouped(&mut derived, &module.modifiers);
        }
        derived
    }

    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        Self::from_json_str(&json)
    }
}
