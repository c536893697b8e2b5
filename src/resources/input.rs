//! Input types consumed by ability modules.
//!
//! [`RawInput`] is the per-frame intent of one character: two axes and three
//! buttons, with no history. [`InputSnapshot`] adds press/release edges and
//! is what modules read. Turning the former into the latter (and latching
//! edges for the fixed tick) is done by
//! [`ControlInput`](crate::components::controlinput::ControlInput).

use serde::{Deserialize, Serialize};

/// State of a single digital button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitalButtonState {
    /// Whether the button is currently held down.
    pub pressed: bool,
    /// Whether the button went down since the previous sample.
    pub just_pressed: bool,
    /// Whether the button went up since the previous sample.
    pub just_released: bool,
}

impl DigitalButtonState {
    /// Edges between two held states.
    pub fn from_transition(was_pressed: bool, is_pressed: bool) -> Self {
        Self {
            pressed: is_pressed,
            just_pressed: is_pressed && !was_pressed,
            just_released: !is_pressed && was_pressed,
        }
    }

    /// Same held state, with `other`'s edges folded in.
    pub fn with_edges_from(self, other: DigitalButtonState) -> Self {
        Self {
            pressed: self.pressed,
            just_pressed: self.just_pressed || other.just_pressed,
            just_released: self.just_released || other.just_released,
        }
    }

    /// Same held state, no edges.
    pub fn held_only(self) -> Self {
        Self {
            pressed: self.pressed,
            just_pressed: false,
            just_released: false,
        }
    }
}

/// Input state a module sees for one frame or fixed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Walk axis in [-1, 1].
    pub walk_axis: f32,
    /// Run axis in [-1, 1]. Takes priority over walk when past the deadzone.
    pub run_axis: f32,
    pub jump: DigitalButtonState,
    pub attack: DigitalButtonState,
    pub crouch: DigitalButtonState,
}

/// Held state of every input for one frame, as produced by a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    pub walk_axis: f32,
    pub run_axis: f32,
    pub jump: bool,
    pub attack: bool,
    pub crouch: bool,
}

impl RawInput {
    /// Axes clamped to [-1, 1]; non-finite values become 0.
    pub fn sanitized(self) -> Self {
        fn axis(v: f32) -> f32 {
            if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
        }
        Self {
            walk_axis: axis(self.walk_axis),
            run_axis: axis(self.run_axis),
            ..self
        }
    }
}

impl InputSnapshot {
    /// Snapshot for `current`, with edges computed against `previous`.
    pub fn from_transition(previous: &RawInput, current: &RawInput) -> Self {
        Self {
            walk_axis: current.walk_axis,
            run_axis: current.run_axis,
            jump: DigitalButtonState::from_transition(previous.jump, current.jump),
            attack: DigitalButtonState::from_transition(previous.attack, current.attack),
            crouch: DigitalButtonState::from_transition(previous.crouch, current.crouch),
        }
    }

    /// Fold the edges of `other` into this snapshot, keeping held state.
    pub fn accumulate_edges(&mut self, other: &InputSnapshot) {
        self.jump = self.jump.with_edges_from(other.jump);
        self.attack = self.attack.with_edges_from(other.attack);
        self.crouch = self.crouch.with_edges_from(other.crouch);
    }

    /// Copy without edges.
    pub fn held_only(&self) -> Self {
        Self {
            jump: self.jump.held_only(),
            attack: self.attack.held_only(),
            crouch: self.crouch.held_only(),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_detects_edges() {
        assert_eq!(
            DigitalButtonState::from_transition(false, true),
            DigitalButtonState {
                pressed: true,
                just_pressed: true,
                just_released: false
            }
        );
        assert!(DigitalButtonState::from_transition(true, false).just_released);
        assert_eq!(
            DigitalButtonState::from_transition(true, true),
            DigitalButtonState {
                pressed: true,
                just_pressed: false,
                just_released: false
            }
        );
    }

    #[test]
    fn sanitize_clamps_axes() {
        let raw = RawInput {
            walk_axis: 3.0,
            run_axis: f32::NAN,
            ..RawInput::default()
        }
        .sanitized();
        assert_eq!(raw.walk_axis, 1.0);
        assert_eq!(raw.run_axis, 0.0);
    }

    #[test]
    fn accumulated_edges_survive_held_state_change() {
        let idle = RawInput::default();
        let pressed = RawInput {
            jump: true,
            ..RawInput::default()
        };
        let mut latched = InputSnapshot::from_transition(&idle, &pressed);
        let release = InputSnapshot::from_transition(&pressed, &idle);
        let mut next = release;
        next.accumulate_edges(&latched);
        assert!(!next.jump.pressed);
        assert!(next.jump.just_pressed);
        assert!(next.jump.just_released);

        latched = latched.held_only();
        assert!(latched.jump.pressed && !latched.jump.just_pressed);
    }
}
