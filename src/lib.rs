//! Modular ability and movement composition for 2D platformer characters.
//!
//! This library exposes the ability modules, stat pipeline, ECS components,
//! resources, systems and events, plus a headless [`game::Simulation`] host
//! used by the binary and the integration tests.

pub mod abilities;
pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod stats;
pub mod systems;
