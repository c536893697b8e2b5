//! Ground sensing, once per fixed tick before the controllers run.
use bevy_ecs::prelude::*;

use crate::components::groundsensor::GroundSensor;
use crate::components::mapposition::MapPosition;
use crate::resources::levelgeometry::LevelGeometry;

pub fn update_ground_sensors(
    level: Option<Res<LevelGeometry>>,
    mut query: Query<(&MapPosition, &mut GroundSensor)>,
) {
    let empty = LevelGeometry::default();
    let level = level.as_deref().unwrap_or(&empty);
    for (position, mut sensor) in query.iter_mut() {
        sensor.sense(position.pos, level);
    }
}
