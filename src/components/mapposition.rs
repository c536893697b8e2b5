use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World position of an entity's pivot (feet for characters). Y is up.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        MapPosition {
            pos: Vec2::new(x, y),
        }
    }

    pub fn from_vec(pos: Vec2) -> Self {
        MapPosition { pos }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
}
