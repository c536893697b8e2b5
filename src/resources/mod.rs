//! ECS resources made available to systems.
//!
//! Overview
//! - `abilitysetstore` – loaded ability sets keyed by id
//! - `assets` – error type shared by every loader
//! - `fixedtime` – accumulator clock for physics ticks
//! - `gameconfig` – INI-backed simulation settings
//! - `input` – button and snapshot types read by ability modules
//! - `levelgeometry` – static level solids, shape casts and body movement
//! - `worldtime` – simulation time and delta
pub mod abilitysetstore;
pub mod assets;
pub mod fixedtime;
pub mod gameconfig;
pub mod input;
pub mod levelgeometry;
pub mod worldtime;
