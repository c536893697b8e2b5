//! Runtime ability set swaps.
//!
//! Triggering an [`EquipAbilitySetRequest`] is the one way to change a
//! character's capabilities while the simulation runs (power-ups,
//! transformations). The observer resolves the set id against the
//! [`AbilitySetStore`] and equips it in one step, outside the frame and
//! fixed ticks, so no tick ever sees a half-swapped controller.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::warn;

use crate::abilities::ModuleInit;
use crate::components::charactercontroller::CharacterController;
use crate::components::rigidbody::RigidBody;
use crate::resources::abilitysetstore::AbilitySetStore;
use crate::resources::worldtime::WorldTime;

/// Ask `entity` to equip the set `set_id`, or to unequip with `None`.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct EquipAbilitySetRequest {
    pub entity: Entity,
    pub set_id: Option<String>,
}

/// Observer that performs [`EquipAbilitySetRequest`]s.
///
/// Unknown set ids and entities without a controller and body are reported
/// and otherwise ignored.
pub fn equip_ability_set_observer(
    trigger: On<EquipAbilitySetRequest>,
    store: Option<Res<AbilitySetStore>>,
    time: Res<WorldTime>,
    mut controllers: Query<(&mut CharacterController, &mut RigidBody)>,
) {
    let request = trigger.event();
    let Ok((mut controller, mut body)) = controllers.get_mut(request.entity) else {
        warn!(
            "Equip request for {:?} ignored: no character controller with a body",
            request.entity
        );
        return;
    };

    let set = match &request.set_id {
        None => None,
        Some(id) => match store.as_deref().and_then(|s| s.get(id)) {
            Some(set) => Some(set),
            None => {
                warn!("Equip request for {:?} ignored: unknown ability set '{}'", request.entity, id);
                return;
            }
        },
    };

    controller.equip_ability_set(
        set,
        &mut body,
        ModuleInit {
            owner: Some(request.entity),
            now: time.elapsed,
        },
    );
}
