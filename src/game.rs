//! Headless simulation host.
//!
//! [`Simulation`] owns the ECS [`World`] and the two schedules the ability
//! pipeline needs, and drives them from a variable frame delta:
//!
//! 1. advance [`WorldTime`] by the scaled frame delta
//! 2. run the frame schedule: sample input, validate new controllers, run
//!    non-movement modules, publish status
//! 3. run the fixed schedule once per whole fixed timestep accumulated:
//!    latch input, sense ground, fold movement modules, integrate bodies
//!
//! Nothing here assumes which of the two rates is higher.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{info, warn};

use crate::abilities::AbilitySet;
use crate::components::boxcollider::BoxCollider;
use crate::components::charactercontroller::CharacterController;
use crate::components::characterstatus::CharacterStatus;
use crate::components::controlinput::{ControlInput, InputDriver};
use crate::components::groundsensor::{GroundSensor, GroundSensorConfig};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::ability::log_ability_effect;
use crate::events::equip::{EquipAbilitySetRequest, equip_ability_set_observer};
use crate::resources::abilitysetstore::AbilitySetStore;
use crate::resources::fixedtime::FixedTime;
use crate::resources::gameconfig::GameConfig;
use crate::resources::levelgeometry::LevelGeometry;
use crate::resources::worldtime::WorldTime;
use crate::stats::StatStore;
use crate::systems::charactercontroller::{
    character_fixed_system, character_frame_system, publish_character_status,
    validate_controllers,
};
use crate::systems::groundsensor::update_ground_sensors;
use crate::systems::input::{latch_fixed_input, sample_control_input};
use crate::systems::movement::movement_system;
use crate::systems::time::{advance_fixed_time, fixed_steps_due, update_world_time};

/// Everything needed to put a character in the world.
pub struct CharacterSpawn {
    pub position: Vec2,
    /// `None` falls back to default stats.
    pub base_stats: Option<StatStore>,
    pub initial_set: Option<Arc<AbilitySet>>,
    /// `None` spawns a controller with no input source, which disables it.
    pub driver: Option<InputDriver>,
    pub collider: BoxCollider,
    /// `None` uses the sensor defaults from [`GameConfig`].
    pub sensor: Option<GroundSensorConfig>,
}

impl Default for CharacterSpawn {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            base_stats: None,
            initial_set: None,
            driver: Some(InputDriver::Idle),
            collider: BoxCollider::new(1.0, 1.8).with_offset(Vec2::new(-0.5, 0.0)),
            sensor: None,
        }
    }
}

pub struct Simulation {
    pub world: World,
    frame: Schedule,
    fixed: Schedule,
}

impl Simulation {
    pub fn new(config: GameConfig, level: LevelGeometry, sets: AbilitySetStore) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
        world.insert_resource(
            FixedTime::new(config.fixed_timestep).with_max_steps(config.max_fixed_steps),
        );
        world.insert_resource(config);
        world.insert_resource(level);
        world.insert_resource(sets);

        world.spawn(Observer::new(equip_ability_set_observer));
        world.spawn(Observer::new(log_ability_effect));
        // Ensure the observers are registered before any system triggers events.
        world.flush();

        let mut frame = Schedule::default();
        frame.add_systems(
            (
                sample_control_input,
                validate_controllers,
                character_frame_system,
                publish_character_status,
            )
                .chain(),
        );

        let mut fixed = Schedule::default();
        fixed.add_systems(
            (
                latch_fixed_input,
                update_ground_sensors,
                character_fixed_system,
                movement_system,
            )
                .chain(),
        );

        Self {
            world,
            frame,
            fixed,
        }
    }

    /// Build a simulation from config, loading the level and ability sets it
    /// names. Missing assets are reported and replaced by empty ones.
    pub fn from_config(config: GameConfig) -> Self {
        let level = match &config.level_path {
            Some(path) => LevelGeometry::load(&config.resolve(path)).unwrap_or_else(|e| {
                warn!("Level unusable ({}), using an empty level", e);
                LevelGeometry::default()
            }),
            None => LevelGeometry::default(),
        };
        let mut sets = AbilitySetStore::new();
        if let Some(dir) = &config.ability_sets_dir {
            if let Err(e) = sets.load_dir(&config.resolve(dir)) {
                warn!("Ability sets unavailable: {}", e);
            }
        }
        Self::new(config, level, sets)
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }

    pub fn ability_sets(&self) -> &AbilitySetStore {
        self.world.resource::<AbilitySetStore>()
    }

    /// Load base stats named by the config, or defaults.
    pub fn configured_base_stats(&self) -> StatStore {
        let config = self.config();
        let path = config.base_stats_path.as_deref().map(|p| config.resolve(p));
        StatStore::load_or_default(path.as_deref())
    }

    pub fn spawn_character(&mut self, spawn: CharacterSpawn) -> Entity {
        let sensor = spawn
            .sensor
            .unwrap_or(self.world.resource::<GameConfig>().ground);
        let mut controller = CharacterController::new(spawn.base_stats);
        if let Some(set) = spawn.initial_set {
            controller = controller.with_initial_set(set);
        }
        let mut entity = self.world.spawn((
            MapPosition::from_vec(spawn.position),
            RigidBody::new(),
            spawn.collider,
            GroundSensor::new(sensor),
            controller,
            CharacterStatus::default(),
        ));
        if let Some(driver) = spawn.driver {
            entity.insert(ControlInput::new(driver));
        }
        let id = entity.id();
        info!("Spawned character {:?} at {:?}", id, spawn.position);
        id
    }

    /// Equip a set from the store right away. `None` unequips.
    pub fn request_equip(&mut self, entity: Entity, set_id: Option<&str>) {
        self.world.trigger(EquipAbilitySetRequest {
            entity,
            set_id: set_id.map(str::to_owned),
        });
        self.world.flush();
    }

    /// Advance by one frame of `dt` unscaled seconds. Returns the number of
    /// fixed ticks that ran.
    pub fn step(&mut self, dt: f32) -> u32 {
        update_world_time(&mut self.world, dt);
        self.frame.run(&mut self.world);

        let steps = fixed_steps_due(&mut self.world);
        for _ in 0..steps {
            self.fixed.run(&mut self.world);
            advance_fixed_time(&mut self.world);
        }
        self.world.clear_trackers();
        steps
    }

    /// Step `frames` times with the configured frame time.
    pub fn run_frames(&mut self, frames: u32) {
        let dt = self.config().frame_time;
        for _ in 0..frames {
            self.step(dt);
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.world.resource::<WorldTime>().elapsed
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<MapPosition>(entity).map(|p| p.pos)
    }

    pub fn velocity(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<RigidBody>(entity).map(|b| b.velocity)
    }

    pub fn status(&self, entity: Entity) -> Option<&CharacterStatus> {
        self.world.get::<CharacterStatus>(entity)
    }

    pub fn controller(&self, entity: Entity) -> Option<&CharacterController> {
        self.world.get::<CharacterController>(entity)
    }

    pub fn control_input_mut(&mut self, entity: Entity) -> Option<Mut<'_, ControlInput>> {
        self.world.get_mut::<ControlInput>(entity)
    }
}

/// Load a simulation config file, keeping defaults when it is absent.
pub fn load_config(path: &Path) -> GameConfig {
    let mut config = GameConfig::with_path(path);
    if let Err(e) = config.load_from_file() {
        warn!("Config unusable ({}), using defaults", e);
    }
    config
}
