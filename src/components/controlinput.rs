//! Per-character input source and fixed-tick latch.
//!
//! [`ControlInput`] is the InputSnapshot source of a character controller.
//! Every frame its [`InputDriver`] produces a [`RawInput`]; the component
//! turns it into the frame snapshot and remembers press/release edges until
//! the next fixed tick consumes them. With several frames per fixed tick no
//! edge is lost, and with several fixed ticks per frame an edge is seen by
//! the first tick only.

use std::path::Path;

use bevy_ecs::prelude::Component;
use fastrand::Rng;
use log::info;
use serde::Deserialize;

use crate::resources::assets::{AssetError, read_text};
use crate::resources::input::{InputSnapshot, RawInput};

/// Where a character's raw intent comes from.
#[derive(Debug, Clone)]
pub enum InputDriver {
    Idle,
    /// Fixed state, set by the host (tests, replays).
    Manual(RawInput),
    Scripted(InputScript),
    Wander(WanderBrain),
}

impl InputDriver {
    /// Raw intent at `now`. `speed_x` is the body's current horizontal speed.
    pub fn sample(&mut self, now: f32, speed_x: f32) -> RawInput {
        match self {
            InputDriver::Idle => RawInput::default(),
            InputDriver::Manual(raw) => *raw,
            InputDriver::Scripted(script) => script.sample(now),
            InputDriver::Wander(brain) => brain.sample(now, speed_x),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct ControlInput {
    pub driver: InputDriver,
    previous: RawInput,
    frame: InputSnapshot,
    pending_edges: InputSnapshot,
    fixed: InputSnapshot,
}

impl ControlInput {
    pub fn new(driver: InputDriver) -> Self {
        Self {
            driver,
            previous: RawInput::default(),
            frame: InputSnapshot::default(),
            pending_edges: InputSnapshot::default(),
            fixed: InputSnapshot::default(),
        }
    }

    pub fn idle() -> Self {
        Self::new(InputDriver::Idle)
    }

    pub fn manual(raw: RawInput) -> Self {
        Self::new(InputDriver::Manual(raw))
    }

    /// Replace a manual driver's state. Other drivers become manual.
    pub fn set_manual(&mut self, raw: RawInput) {
        self.driver = InputDriver::Manual(raw);
    }

    /// Sample the driver and start a new frame.
    pub fn sample(&mut self, now: f32, speed_x: f32) {
        let raw = self.driver.sample(now, speed_x);
        self.begin_frame(raw);
    }

    /// Start a new frame from an explicit raw state.
    pub fn begin_frame(&mut self, raw: RawInput) {
        let raw = raw.sanitized();
        self.frame = InputSnapshot::from_transition(&self.previous, &raw);
        self.pending_edges.accumulate_edges(&self.frame);
        self.previous = raw;
    }

    /// Produce the snapshot for the next fixed tick and clear pending edges.
    pub fn latch_fixed(&mut self) {
        let mut fixed = self.frame.held_only();
        fixed.accumulate_edges(&self.pending_edges);
        self.fixed = fixed;
        self.pending_edges = InputSnapshot::default();
    }

    /// Snapshot for frame processing.
    pub fn frame(&self) -> &InputSnapshot {
        &self.frame
    }

    /// Snapshot for fixed-tick processing.
    pub fn fixed(&self) -> &InputSnapshot {
        &self.fixed
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct Keyframe {
    at: f32,
    walk: Option<f32>,
    run: Option<f32>,
    jump: Option<bool>,
    attack: Option<bool>,
    crouch: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct InputScriptAsset {
    #[serde(default)]
    keyframes: Vec<Keyframe>,
    #[serde(default)]
    loop_after: Option<f32>,
}

/// Timeline of raw input states.
///
/// Each keyframe overrides only the fields it names; the rest carry over
/// from the previous keyframe.
///
/// ```json
/// { "keyframes": [
///     { "at": 0.0, "walk": 1.0 },
///     { "at": 1.0, "jump": true },
///     { "at": 1.3, "jump": false }
/// ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputScript {
    states: Vec<(f32, RawInput)>,
    loop_after: Option<f32>,
}

impl From<InputScriptAsset> for InputScript {
    fn from(asset: InputScriptAsset) -> Self {
        let mut keyframes = asset.keyframes;
        keyframes.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut current = RawInput::default();
        let states = keyframes
            .into_iter()
            .map(|k| {
                current = RawInput {
                    walk_axis: k.walk.unwrap_or(current.walk_axis),
                    run_axis: k.run.unwrap_or(current.run_axis),
                    jump: k.jump.unwrap_or(current.jump),
                    attack: k.attack.unwrap_or(current.attack),
                    crouch: k.crouch.unwrap_or(current.crouch),
                };
                (k.at, current)
            })
            .collect();
        Self {
            states,
            loop_after: asset.loop_after.filter(|t| *t > 0.0),
        }
    }
}

impl InputScript {
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        let asset: InputScriptAsset = serde_json::from_str(json)?;
        Ok(asset.into())
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let script = Self::from_json_str(&read_text(path)?)?;
        info!("Loaded input script {:?}: {} keyframes", path, script.states.len());
        Ok(script)
    }

    pub fn sample(&self, now: f32) -> RawInput {
        let t = match self.loop_after {
            Some(period) => now.rem_euclid(period),
            None => now,
        };
        let idx = self.states.partition_point(|(at, _)| *at <= t);
        idx.checked_sub(1)
            .map(|i| self.states[i].1)
            .unwrap_or_default()
    }
}

/// Seeded wandering AI: walks, turns around when stuck, jumps now and then.
#[derive(Debug, Clone)]
pub struct WanderBrain {
    rng: Rng,
    direction: f32,
    running: bool,
    next_decision_at: f32,
    stalled_since: Option<f32>,
    jump_until: f32,
}

/// Seconds of no progress before turning around.
const WANDER_STALL_TIME: f32 = 0.3;
const WANDER_JUMP_HOLD: f32 = 0.25;

impl WanderBrain {
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let direction = if rng.bool() { 1.0 } else { -1.0 };
        Self {
            rng,
            direction,
            running: false,
            next_decision_at: 0.0,
            stalled_since: None,
            jump_until: f32::NEG_INFINITY,
        }
    }

    fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.f32() * (max - min)
    }

    pub fn sample(&mut self, now: f32, speed_x: f32) -> RawInput {
        if speed_x.abs() < 0.05 && now > 0.0 {
            let since = *self.stalled_since.get_or_insert(now);
            if now - since >= WANDER_STALL_TIME {
                self.direction = -self.direction;
                self.stalled_since = None;
            }
        } else {
            self.stalled_since = None;
        }

        if now >= self.next_decision_at {
            self.running = self.rng.f32() < 0.3;
            if self.rng.f32() < 0.4 {
                self.jump_until = now + WANDER_JUMP_HOLD;
            }
            if self.rng.f32() < 0.15 {
                self.direction = -self.direction;
            }
            self.next_decision_at = now + self.random_range(0.5, 1.5);
        }

        RawInput {
            walk_axis: if self.running { 0.0 } else { self.direction },
            run_axis: if self.running { self.direction } else { 0.0 },
            jump: now < self.jump_until,
            attack: false,
            crouch: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump(pressed: bool) -> RawInput {
        RawInput {
            jump: pressed,
            ..RawInput::default()
        }
    }

    #[test]
    fn press_and_release_between_ticks_is_still_seen() {
        let mut input = ControlInput::idle();
        input.begin_frame(jump(true));
        input.begin_frame(jump(false));
        input.latch_fixed();
        assert!(input.fixed().jump.just_pressed);
        assert!(input.fixed().jump.just_released);
        assert!(!input.fixed().jump.pressed);
    }

    #[test]
    fn edge_reaches_only_first_tick_of_a_frame() {
        let mut input = ControlInput::idle();
        input.begin_frame(jump(true));
        input.latch_fixed();
        assert!(input.fixed().jump.just_pressed);
        input.latch_fixed();
        assert!(!input.fixed().jump.just_pressed);
        assert!(input.fixed().jump.pressed);
    }

    #[test]
    fn frame_snapshot_tracks_edges_per_frame() {
        let mut input = ControlInput::idle();
        input.begin_frame(jump(true));
        assert!(input.frame().jump.just_pressed);
        input.begin_frame(jump(true));
        assert!(!input.frame().jump.just_pressed);
        assert!(input.frame().jump.pressed);
    }

    #[test]
    fn script_carries_unset_fields_forward() {
        let script = InputScript::from_json_str(
            r#"{ "keyframes": [
                { "at": 1.0, "jump": true },
                { "at": 0.0, "walk": 1.0 },
                { "at": 1.5, "jump": false }
            ] }"#,
        )
        .expect("valid script");
        assert_eq!(script.sample(-1.0), RawInput::default());
        assert_eq!(script.sample(0.5).walk_axis, 1.0);
        let at_jump = script.sample(1.2);
        assert!(at_jump.jump);
        assert_eq!(at_jump.walk_axis, 1.0);
        assert!(!script.sample(2.0).jump);
    }

    #[test]
    fn looping_script_wraps() {
        let script = InputScript::from_json_str(
            r#"{ "loop_after": 2.0, "keyframes": [
                { "at": 0.0, "walk": 1.0 },
                { "at": 1.0, "walk": -1.0 }
            ] }"#,
        )
        .expect("valid script");
        assert_eq!(script.sample(2.5).walk_axis, 1.0);
        assert_eq!(script.sample(3.5).walk_axis, -1.0);
    }

    #[test]
    fn wander_is_deterministic_per_seed() {
        let mut a = WanderBrain::new(7);
        let mut b = WanderBrain::new(7);
        for i in 0..200 {
            let t = i as f32 * 0.05;
            assert_eq!(a.sample(t, 1.0), b.sample(t, 1.0));
        }
    }

    #[test]
    fn wander_turns_around_when_stuck() {
        let mut brain = WanderBrain::new(3);
        // Past the first decision so only the stall check can turn.
        let first = brain.sample(0.0, 1.0);
        let heading = first.walk_axis + first.run_axis;
        brain.next_decision_at = f32::INFINITY;
        brain.sample(0.1, 0.0);
        let turned = brain.sample(0.45, 0.0);
        assert_eq!(turned.walk_axis + turned.run_axis, -heading);
    }
}
