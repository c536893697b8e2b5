//! Simulation systems.
//!
//! Submodules overview
//! - [`charactercontroller`] – controller validation, frame and fixed ticks, status publishing
//! - [`groundsensor`] – feet sensing before each fixed tick
//! - [`input`] – per-frame input sampling and fixed-tick latching
//! - [`movement`] – gravity and body movement against level geometry
//! - [`time`] – frame clock and fixed clock bookkeeping

pub mod charactercontroller;
pub mod groundsensor;
pub mod input;
pub mod movement;
pub mod time;
