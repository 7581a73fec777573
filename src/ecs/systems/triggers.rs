//! Interaction volumes. Only enter edges fire: a player standing inside an
//! animal's volume triggers once until they leave and come back.

use crate::collab::{Classifier, SpatialQuery};
use crate::ecs::components::{InteractVolume, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Touch {
        animal: hecs::Entity,
        player: hecs::Entity,
    },
    Feed {
        animal: hecs::Entity,
        food: hecs::Entity,
    },
}

/// Diff each volume's occupants against the previous tick and append enter
/// events to `events`.
pub fn update(world: &mut hecs::World, spatial: &dyn SpatialQuery, events: &mut Vec<TriggerEvent>) {
    for (animal, (pos, volume)) in world.query_mut::<(&Position, &mut InteractVolume)>() {
        let players = spatial.overlap_sphere(pos.0, volume.radius, Classifier::Player);
        let foods = spatial.overlap_sphere(pos.0, volume.radius, Classifier::Food);

        for &player in &players {
            if !volume.inside.contains(&player) {
                events.push(TriggerEvent::Touch { animal, player });
            }
        }
        for &food in &foods {
            if !volume.inside.contains(&food) {
                events.push(TriggerEvent::Feed { animal, food });
            }
        }

        volume.inside.clear();
        volume.inside.extend(players);
        volume.inside.extend(foods);
    }
}
