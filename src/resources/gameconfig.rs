//! Simulation configuration resource.
//!
//! Settings loaded from an INI file. Every key is optional; anything missing
//! keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! fixed_timestep = 0.02
//! frame_time = 0.0166667
//! time_scale = 1.0
//! max_fixed_steps = 8
//!
//! [physics]
//! gravity = 30.0
//!
//! [ground]
//! sensor_width = 0.9
//! sensor_height = 0.2
//! sensor_offset_y = 0.0
//! slope_threshold = 5.0
//! deep_slope_threshold = 45.0
//!
//! [assets]
//! base_stats = assets/stats/player.json
//! ability_sets = assets/abilitysets
//! level = assets/levels/demo.json
//! initial_set = runner
//! ```

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;

use crate::components::groundsensor::GroundSensorConfig;
use crate::resources::assets::AssetError;

const DEFAULT_FIXED_TIMESTEP: f32 = 0.02;
const DEFAULT_FRAME_TIME: f32 = 1.0 / 60.0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_MAX_FIXED_STEPS: u32 = 8;
const DEFAULT_GRAVITY: f32 = 30.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Seconds per physics tick.
    pub fixed_timestep: f32,
    /// Seconds per frame when the host runs headless.
    pub frame_time: f32,
    pub time_scale: f32,
    pub max_fixed_steps: u32,
    /// Downward acceleration in world units per second squared.
    pub gravity: f32,
    /// Defaults for characters spawned without their own sensor config.
    pub ground: GroundSensorConfig,
    pub base_stats_path: Option<PathBuf>,
    pub ability_sets_dir: Option<PathBuf>,
    pub level_path: Option<PathBuf>,
    pub initial_set: Option<String>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_f32(config: &Ini, section: &str, key: &str) -> Option<f32> {
    config.getfloat(section, key).ok().flatten().map(|v| v as f32)
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            frame_time: DEFAULT_FRAME_TIME,
            time_scale: DEFAULT_TIME_SCALE,
            max_fixed_steps: DEFAULT_MAX_FIXED_STEPS,
            gravity: DEFAULT_GRAVITY,
            ground: GroundSensorConfig::default(),
            base_stats_path: None,
            ability_sets_dir: None,
            level_path: None,
            initial_set: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load settings from `config_path`.
    ///
    /// Missing values retain their current values. Relative asset paths are
    /// kept as written.
    pub fn load_from_file(&mut self) -> Result<(), AssetError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| AssetError::Ini(format!("{}: {}", self.config_path.display(), e)))?;
        self.apply(&config);

        info!(
            "Loaded config {:?}: fixed_timestep={}, gravity={}, slope={}/{}",
            self.config_path,
            self.fixed_timestep,
            self.gravity,
            self.ground.slope_threshold,
            self.ground.deep_slope_threshold
        );
        Ok(())
    }

    /// Parse settings from INI text, for tests and embedded defaults.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), AssetError> {
        let mut config = Ini::new();
        config.read(text.to_owned()).map_err(AssetError::Ini)?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [simulation]
        if let Some(v) = get_f32(config, "simulation", "fixed_timestep").filter(|v| *v > 0.0) {
            self.fixed_timestep = v;
        }
        if let Some(v) = get_f32(config, "simulation", "frame_time").filter(|v| *v > 0.0) {
            self.frame_time = v;
        }
        if let Some(v) = get_f32(config, "simulation", "time_scale") {
            self.time_scale = v;
        }
        if let Some(v) = config.getuint("simulation", "max_fixed_steps").ok().flatten() {
            self.max_fixed_steps = v as u32;
        }

        // [physics]
        if let Some(v) = get_f32(config, "physics", "gravity") {
            self.gravity = v;
        }

        // [ground]
        let mut size = self.ground.box_size;
        if let Some(v) = get_f32(config, "ground", "sensor_width") {
            size.x = v;
        }
        if let Some(v) = get_f32(config, "ground", "sensor_height") {
            size.y = v;
        }
        self.ground.box_size = size;
        if let Some(v) = get_f32(config, "ground", "sensor_offset_y") {
            self.ground.offset = Vec2::new(self.ground.offset.x, v);
        }
        if let Some(v) = get_f32(config, "ground", "slope_threshold") {
            self.ground.slope_threshold = v;
        }
        if let Some(v) = get_f32(config, "ground", "deep_slope_threshold") {
            self.ground.deep_slope_threshold = v;
        }

        // [assets]
        if let Some(v) = config.get("assets", "base_stats") {
            self.base_stats_path = Some(PathBuf::from(v));
        }
        if let Some(v) = config.get("assets", "ability_sets") {
            self.ability_sets_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = config.get("assets", "level") {
            self.level_path = Some(PathBuf::from(v));
        }
        if let Some(v) = config.get("assets", "initial_set") {
            self.initial_set = Some(v);
        }
    }

    /// Save settings to `config_path`, creating the file if needed.
    pub fn save_to_file(&self) -> Result<(), AssetError> {
        let mut config = Ini::new();

        config.set("simulation", "fixed_timestep", Some(self.fixed_timestep.to_string()));
        config.set("simulation", "frame_time", Some(self.frame_time.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        config.set("simulation", "max_fixed_steps", Some(self.max_fixed_steps.to_string()));

        config.set("physics", "gravity", Some(self.gravity.to_string()));

        config.set("ground", "sensor_width", Some(self.ground.box_size.x.to_string()));
        config.set("ground", "sensor_height", Some(self.ground.box_size.y.to_string()));
        config.set("ground", "sensor_offset_y", Some(self.ground.offset.y.to_string()));
        config.set("ground", "slope_threshold", Some(self.ground.slope_threshold.to_string()));
        config.set(
            "ground",
            "deep_slope_threshold",
            Some(self.ground.deep_slope_threshold.to_string()),
        );

        let path_value = |p: &Option<PathBuf>| p.as_deref().map(|p| p.display().to_string());
        config.set("assets", "base_stats", path_value(&self.base_stats_path));
        config.set("assets", "ability_sets", path_value(&self.ability_sets_dir));
        config.set("assets", "level", path_value(&self.level_path));
        config.set("assets", "initial_set", self.initial_set.clone());

        config
            .write(&self.config_path)
            .map_err(|e| AssetError::io(&self.config_path, e))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    /// Resolve a path from the config relative to the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[physics]\ngravity = 12.5\n")
            .expect("valid ini");
        assert_eq!(config.gravity, 12.5);
        assert_eq!(config.fixed_timestep, DEFAULT_FIXED_TIMESTEP);
        assert_eq!(config.ground, GroundSensorConfig::default());
    }

    #[test]
    fn reads_ground_and_assets() {
        let mut config = GameConfig::new();
        config
            .load_from_str(
                "[ground]\nslope_threshold = 10\ndeep_slope_threshold = 50\nsensor_width = 0.5\n\
                 [assets]\ninitial_set = runner\nlevel = levels/demo.json\n",
            )
            .expect("valid ini");
        assert_eq!(config.ground.slope_threshold, 10.0);
        assert_eq!(config.ground.deep_slope_threshold, 50.0);
        assert_eq!(config.ground.box_size, Vec2::new(0.5, 0.2));
        assert_eq!(config.initial_set.as_deref(), Some("runner"));
        assert_eq!(config.level_path, Some(PathBuf::from("levels/demo.json")));
    }

    #[test]
    fn non_positive_timestep_is_ignored() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[simulation]\nfixed_timestep = 0\n")
            .expect("valid ini");
        assert_eq!(config.fixed_timestep, DEFAULT_FIXED_TIMESTEP);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.ini");
        let mut config = GameConfig::with_path(&path);
        config.gravity = 18.0;
        config.initial_set = Some("runner".into());
        config.save_to_file().expect("saved");

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().expect("loaded");
        assert_eq!(loaded.gravity, 18.0);
        assert_eq!(loaded.initial_set.as_deref(), Some("runner"));
    }

    #[test]
    fn relative_paths_resolve_next_to_config() {
        let config = GameConfig::with_path("assets/config.ini");
        assert_eq!(
            config.resolve(Path::new("levels/demo.json")),
            PathBuf::from("assets/levels/demo.json")
        );
    }
}
