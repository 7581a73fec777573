use glam::Vec3;

use crate::collab::{Classifier, SpatialQuery};
use crate::config::AnimalConfig;
use crate::ecs::components::{AnimalName, AnimalState, Brain, Effects, Position};
use crate::ecs::systems::behavior;
use crate::timer::chance;

/// Seconds between distraction opportunity checks.
pub const CHECK_INTERVAL: f32 = 1.0;
/// Chance a check with a player in range turns into a distraction.
pub const DISTRACTION_CHANCE: f32 = 0.3;

/// Periodic distraction opportunity check, run before the behavior update.
/// Herded and already distracted animals are skipped entirely.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    now: f64,
    spatial: &dyn SpatialQuery,
    rng: &mut fastrand::Rng,
) {
    let mut due: Vec<(hecs::Entity, Vec3, f32)> = Vec::new();
    for (entity, (brain, config, pos)) in
        world.query_mut::<(&mut Brain, &AnimalConfig, &Position)>()
    {
        if !config.can_cause_distraction {
            continue;
        }
        brain.distraction_check -= dt;
        if brain.distraction_check > 0.0 {
            continue;
        }
        brain.distraction_check += CHECK_INTERVAL;
        if brain.distraction_check <= 0.0 {
            brain.distraction_check = CHECK_INTERVAL;
        }

        if now - brain.last_distraction_at < config.distraction_cooldown as f64 {
            continue;
        }
        if matches!(brain.state, AnimalState::Distracted | AnimalState::Herded) {
            continue;
        }
        due.push((entity, pos.0, config.distraction_radius));
    }

    for (entity, pos, radius) in due {
        let players = spatial.overlap_sphere(pos, radius, Classifier::Player);
        if players.is_empty() || !chance(rng, DISTRACTION_CHANCE) {
            continue;
        }
        let threat = players
            .iter()
            .filter_map(|&p| world.get::<&Position>(p).ok().map(|pp| pp.0))
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));

        if let Ok((brain, effects, name)) =
            world.query_one_mut::<(&mut Brain, &mut Effects, &AnimalName)>(entity)
        {
            if behavior::force_distraction(brain, threat, rng, effects) {
                log::info!("{} got distracted by a player", name.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::AnimalBuilder;
    use crate::ecs::components::{Facing, Freezable, HerdFollow, Player};
    use crate::testing::{open_ground, RecordingMover};

    fn setup(cooldown: f32) -> (hecs::World, hecs::Entity) {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(11);
        let (mover, _) = RecordingMover::new(Vec3::ZERO);
        let config = AnimalConfig {
            distraction_cooldown: cooldown,
            distraction_radius: 5.0,
            idle_time_min: 100.0,
            idle_time_max: 100.0,
            ..Default::default()
        };
        let animal = AnimalBuilder::new("Pepper", Vec3::ZERO)
            .config(config)
            .locomotion(mover)
            .spawn(&mut world, &mut rng, 0.0)
            .unwrap();
        world.spawn((
            Position(Vec3::new(2.0, 0.0, 0.0)),
            Facing(Vec3::Z),
            Player,
            Freezable::default(),
        ));
        (world, animal)
    }

    /// Run one-second checks until the animal is distracted or `limit` runs out.
    fn run_checks(world: &mut hecs::World, limit: usize, start: f64) -> Option<f64> {
        let mut ground = open_ground();
        ground.refresh(world);
        let mut rng = fastrand::Rng::with_seed(99);
        let mut now = start;
        for _ in 0..limit {
            now += CHECK_INTERVAL as f64;
            update(world, CHECK_INTERVAL, now, &ground, &mut rng);
            let q = world.query_mut::<&Brain>().into_iter().next().map(|(_, b)| b.state);
            if q == Some(AnimalState::Distracted) {
                return Some(now);
            }
        }
        None
    }

    #[test]
    fn player_nearby_eventually_distracts() {
        let (mut world, animal) = setup(0.0);
        assert!(run_checks(&mut world, 200, 0.0).is_some());
        let brain = world.get::<&Brain>(animal).unwrap();
        assert_eq!(brain.threat, Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn cooldown_gates_first_distraction() {
        let (mut world, _) = setup(10.0);
        let at = run_checks(&mut world, 200, 0.0).unwrap();
        assert!(at >= 10.0);
    }

    #[test]
    fn no_player_in_radius_no_distraction() {
        let (mut world, _) = setup(0.0);
        for (_, (pos, _)) in world.query_mut::<(&mut Position, &Player)>() {
            pos.0 = Vec3::new(20.0, 0.0, 0.0);
        }
        assert!(run_checks(&mut world, 200, 0.0).is_none());
    }

    #[test]
    fn herded_animal_is_skipped() {
        let (mut world, animal) = setup(0.0);
        {
            let mut brain = world.get::<&mut Brain>(animal).unwrap();
            behavior::start_herding(
                &mut brain,
                Vec3::X,
                1000.0,
                HerdFollow {
                    player: None,
                    follow_distance: 3.0,
                },
            );
        }
        assert!(run_checks(&mut world, 200, 0.0).is_none());
        assert_eq!(world.get::<&Brain>(animal).unwrap().state, AnimalState::Herded);
    }
}
