//! Ability set registry.
//!
//! Ability sets are loaded once and shared by every controller that equips
//! them. Lookups hand out `Arc`s so swapping a character's set never clones
//! module definitions.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::abilities::AbilitySet;
use crate::resources::assets::AssetError;

/// Registry of ability sets keyed by set id.
#[derive(Resource, Debug, Default)]
pub struct AbilitySetStore {
    pub sets: FxHashMap<String, Arc<AbilitySet>>,
}

impl AbilitySetStore {
    pub fn new() -> Self {
        AbilitySetStore {
            sets: FxHashMap::default(),
        }
    }

    /// Add or replace a set under its own id.
    pub fn insert(&mut self, set: AbilitySet) -> Arc<AbilitySet> {
        let set = Arc::new(set);
        if self.sets.insert(set.id.clone(), set.clone()).is_some() {
            warn!("Ability set '{}' replaced", set.id);
        }
        set
    }

    pub fn get(&self, id: &str) -> Option<Arc<AbilitySet>> {
        self.sets.get(id).cloned()
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn require(&self, id: &str) -> Result<Arc<AbilitySet>, AssetError> {
        self.get(id)
            .ok_or_else(|| AssetError::Missing(format!("ability set '{}'", id)))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sorted set ids.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Load every `*.json` file in `dir`.
    ///
    /// Files that fail to parse are skipped with a warning. Returns the
    /// number of sets loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, AssetError> {
        let entries = std::fs::read_dir(dir).map_err(|e| AssetError::io(dir, e))?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match AbilitySet::load(&path) {
                Ok(set) => {
                    info!(
                        "Loaded ability set '{}' ({} modules) from {:?}",
                        set.id,
                        set.module_count(),
                        path
                    );
                    self.insert(set);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping ability set {:?}: {}", path, e),
            }
        }
        Ok(loaded)
    }
}
