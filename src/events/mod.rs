//! Event types and observers.
//!
//! Submodules:
//! - [`ability`] – effects raised by attack and inhale style modules
//! - [`equip`] – runtime ability set swap requests
pub mod ability;
pub mod equip;
