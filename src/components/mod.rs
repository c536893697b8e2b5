//! ECS components for entities.
//!
//! Submodules overview:
//! - [`boxcollider`] – axis-aligned rectangular collider
//! - [`charactercontroller`] – ability module orchestration per character
//! - [`characterstatus`] – read-only observation for animation and UI
//! - [`controlinput`] – input driver and frame/fixed snapshot latch
//! - [`groundsensor`] – feet sensor and slope classification
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`rigidbody`] – kinematic body storing velocity and gravity settings

pub mod boxcollider;
pub mod charactercontroller;
pub mod characterstatus;
pub mod controlinput;
pub mod groundsensor;
pub mod mapposition;
pub mod rigidbody;
