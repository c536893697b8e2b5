//! Crouch: no horizontal motion while the crouch button is held.

use glam::Vec2;

use super::{AbilityModule, ModuleIdentity, ModuleType, MovementContext, MovementModule};
use crate::resources::input::InputSnapshot;

pub struct Crouch {
    identity: ModuleIdentity,
    crouching: bool,
}

impl Crouch {
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            crouching: false,
        }
    }
}

impl AbilityModule for Crouch {
    fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    fn module_type(&self) -> ModuleType {
        ModuleType::Crouch
    }

    fn on_deactivate(&mut self) {
        self.crouching = false;
    }

    fn status_flag(&self) -> Option<&'static str> {
        self.crouching.then_some("crouching")
    }
}

impl MovementModule for Crouch {
    fn process_movement(
        &mut self,
        velocity: Vec2,
        _is_grounded: bool,
        input: &InputSnapshot,
        _ctx: &MovementContext<'_>,
    ) -> Vec2 {
        self.crouching = input.crouch.pressed;
        if self.crouching {
            Vec2::new(0.0, velocity.y)
        } else {
            velocity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::testing::{Fixture, held};

    #[test]
    fn zeroes_horizontal_velocity_only_while_held() {
        let fx = Fixture::new();
        let mut m = Crouch::new(ModuleIdentity::new("crouch", "Crouch"));
        let crouching = InputSnapshot {
            crouch: held(),
            ..InputSnapshot::default()
        };
        let v = m.process_movement(Vec2::new(3.0, -1.0), true, &crouching, &fx.ctx(0.0));
        assert_eq!(v, Vec2::new(0.0, -1.0));
        assert_eq!(m.status_flag(), Some("crouching"));

        let v = m.process_movement(Vec2::new(3.0, -1.0), true, &InputSnapshot::default(), &fx.ctx(0.02));
        assert_eq!(v, Vec2::new(3.0, -1.0));
        assert_eq!(m.status_flag(), None);
    }
}
