//! Character stats.
//!
//! Numeric gameplay attributes and the modifiers that reshape them.
//!
//! - [`store`] – [`StatStore`](store::StatStore), one `f32` per [`StatId`](store::StatId),
//!   bound through a static table
//! - [`modifier`] – [`StatModifier`](modifier::StatModifier) and the ordered fold that
//!   combines a base value with a list of modifiers
//!
//! Stat stores are designer data. They are loaded from JSON, copied by value
//! and never mutated in place by ability code: the character controller owns
//! the only derived copy.

pub mod modifier;
pub mod store;

pub use modifier::{ModifierOp, StatModifier, apply_modifier, combine_modifiers};
pub use store::{StatId, StatStore};
