//! Interaction mediator: turns touch, feed, and herd events into behavior
//! transitions and ledger mutations. Every entry point is idempotent.

use glam::Vec3;
use log::{debug, info};

use super::behavior::{follow_point, start_herding};
use super::freeze;
use crate::collab::cues;
use crate::config::{AnimalConfig, HerdingConfig};
use crate::ecs::components::{
    AnimalName, AnimalState, Brain, Effects, Facing, Food, HerdFollow, Player, Position,
};
use crate::error::EventError;
use crate::score::ScoreLedger;

/// Position and forward of a player, if `player` is one.
fn player_pose(world: &hecs::World, player: hecs::Entity) -> Option<(Vec3, Vec3)> {
    if world.get::<&Player>(player).is_err() {
        return None;
    }
    let pos = world.get::<&Position>(player).ok()?.0;
    let facing = world.get::<&Facing>(player).ok()?.0;
    Some((pos, facing))
}

fn first_player(world: &hecs::World) -> Option<hecs::Entity> {
    world
        .query::<(&Position, &Player)>()
        .iter()
        .map(|(e, _)| e)
        .next()
}

fn animal_name(world: &hecs::World, animal: hecs::Entity) -> String {
    world
        .get::<&AnimalName>(animal)
        .map(|n| n.0.clone())
        .unwrap_or_else(|_| format!("{animal:?}"))
}

/// A player walked into an animal. Freezes the player and deducts the
/// penalty. Returns `Ok(false)` when the player is already frozen.
pub fn player_touched(
    world: &mut hecs::World,
    ledger: &mut ScoreLedger,
    animal: hecs::Entity,
    player: hecs::Entity,
) -> Result<bool, EventError> {
    let (duration, penalty) = {
        let config = world
            .get::<&AnimalConfig>(animal)
            .map_err(|_| EventError::NotAnAnimal(animal))?;
        (config.freeze_duration, config.freeze_penalty)
    };
    if world.get::<&Player>(player).is_err() {
        return Err(EventError::NotAPlayer(player));
    }
    if !freeze::acquire(world, player, animal, duration)? {
        debug!("Player {player:?} already frozen, ignoring touch");
        return Ok(false);
    }

    ledger.add_points(penalty);
    if let Ok(mut effects) = world.get::<&mut Effects>(animal) {
        effects.cue(cues::TOUCH);
    }
    info!(
        "{} froze player {player:?} for {duration:.1}s ({penalty} points)",
        animal_name(world, animal)
    );
    Ok(true)
}

/// Food reached an animal. The food is eaten and the animal follows the
/// player who threw it. Returns `Ok(false)` without eating when the animal
/// is already being herded by feeding.
pub fn fed(
    world: &mut hecs::World,
    animal: hecs::Entity,
    food: hecs::Entity,
) -> Result<bool, EventError> {
    let thrown_by = world
        .get::<&Food>(food)
        .map_err(|_| EventError::NotFood(food))?
        .thrown_by;
    let (already_herded, duration, distance) = {
        let brain = world
            .get::<&Brain>(animal)
            .map_err(|_| EventError::NotAnAnimal(animal))?;
        let config = world
            .get::<&AnimalConfig>(animal)
            .map_err(|_| EventError::NotAnAnimal(animal))?;
        (
            brain.is_being_herded,
            config.herding_duration,
            config.follow_distance,
        )
    };
    if already_herded {
        return Ok(false);
    }

    // Food is gone either way from here on.
    let _ = world.despawn(food);
    if let Ok(mut effects) = world.get::<&mut Effects>(animal) {
        effects.cue(cues::FEED);
    }

    let leader = thrown_by
        .filter(|&p| player_pose(world, p).is_some())
        .or_else(|| first_player(world));
    let Some((leader, (pos, facing))) = leader.and_then(|p| Some((p, player_pose(world, p)?)))
    else {
        debug!("{} ate with nobody around to follow", animal_name(world, animal));
        return Ok(true);
    };

    let name = animal_name(world, animal);
    let mut brain = world
        .get::<&mut Brain>(animal)
        .map_err(|_| EventError::NotAnAnimal(animal))?;
    if brain.state != AnimalState::Herded {
        start_herding(
            &mut brain,
            follow_point(pos, facing, distance),
            duration,
            HerdFollow {
                player: Some(leader),
                follow_distance: distance,
            },
        );
    }
    brain.is_being_herded = true;
    info!("{name} is following player {leader:?} for {duration:.1}s");
    Ok(true)
}

/// Broadcast herd command: every animal not already herded follows
/// `player`. Returns the number of animals that started following.
pub fn herd_all(
    world: &mut hecs::World,
    player: hecs::Entity,
    herding: &HerdingConfig,
) -> Result<usize, EventError> {
    let (pos, facing) = player_pose(world, player).ok_or(EventError::NotAPlayer(player))?;
    let target = follow_point(pos, facing, herding.follow_distance);
    let follow = HerdFollow {
        player: Some(player),
        follow_distance: herding.follow_distance,
    };

    let mut herded = 0;
    for (_, brain) in world.query_mut::<&mut Brain>() {
        if start_herding(brain, target, herding.duration, follow) {
            herded += 1;
        }
    }
    info!("Herd command from player {player:?}: {herded} animals following");
    Ok(herded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::AnimalBuilder;
    use crate::ecs::components::Freezable;
    use crate::ecs::systems::behavior::{self, BehaviorBuffers};
    use crate::testing::{open_ground, RecordingEffects, RecordingMover};

    fn quiet() -> AnimalConfig {
        AnimalConfig {
            can_cause_messes: false,
            can_cause_distraction: false,
            ..Default::default()
        }
    }

    fn spawn_animal(world: &mut hecs::World, config: AnimalConfig) -> (hecs::Entity, RecordingEffects) {
        let mut rng = fastrand::Rng::with_seed(3);
        let (mover, _) = RecordingMover::new(Vec3::ZERO);
        let effects = RecordingEffects::default();
        let animal = AnimalBuilder::new("Pickles", Vec3::ZERO)
            .config(config)
            .locomotion(mover)
            .effects(effects.clone())
            .spawn(world, &mut rng, 0.0)
            .unwrap();
        (animal, effects)
    }

    fn spawn_player(world: &mut hecs::World, pos: Vec3) -> hecs::Entity {
        world.spawn((Position(pos), Facing(Vec3::Z), Player, Freezable::default()))
    }

    #[test]
    fn feeding_herds_until_duration_elapses() {
        let mut world = hecs::World::new();
        let (animal, effects) = spawn_animal(
            &mut world,
            AnimalConfig {
                herding_duration: 5.0,
                ..quiet()
            },
        );
        let player = spawn_player(&mut world, Vec3::new(4.0, 0.0, 0.0));
        let food = world.spawn((Position(Vec3::ZERO), Food { thrown_by: Some(player) }));

        assert_eq!(fed(&mut world, animal, food), Ok(true));
        assert!(!world.contains(food));
        assert!(effects.cues.lock().unwrap().contains(&cues::FEED.to_string()));
        {
            let brain = world.get::<&Brain>(animal).unwrap();
            assert_eq!(brain.state, AnimalState::Herded);
            assert!(brain.is_being_herded);
            assert_eq!(brain.target, Some(Vec3::new(4.0, 0.0, -3.0)));
        }

        let ground = open_ground();
        let mut rng = fastrand::Rng::with_seed(9);
        let mut bufs = BehaviorBuffers::new();
        for i in 0..10 {
            assert_eq!(world.get::<&Brain>(animal).unwrap().state, AnimalState::Herded);
            behavior::update(&mut world, 0.5, i as f64 * 0.5, &ground, &mut rng, &mut bufs);
        }
        let brain = world.get::<&Brain>(animal).unwrap();
        assert_eq!(brain.state, AnimalState::Idle);
        assert!(!brain.is_being_herded);
    }

    #[test]
    fn second_feed_is_noop() {
        let mut world = hecs::World::new();
        let (animal, _) = spawn_animal(&mut world, quiet());
        spawn_player(&mut world, Vec3::ZERO);
        let first = world.spawn((Position(Vec3::ZERO), Food { thrown_by: None }));
        let second = world.spawn((Position(Vec3::ZERO), Food { thrown_by: None }));

        assert_eq!(fed(&mut world, animal, first), Ok(true));
        let timer_before = world.get::<&Brain>(animal).unwrap().timer;
        assert_eq!(fed(&mut world, animal, second), Ok(false));
        assert!(world.contains(second));
        assert_eq!(world.get::<&Brain>(animal).unwrap().timer, timer_before);
    }

    #[test]
    fn feeding_without_players_only_eats() {
        let mut world = hecs::World::new();
        let (animal, _) = spawn_animal(&mut world, quiet());
        let food = world.spawn((Position(Vec3::ZERO), Food { thrown_by: None }));

        assert_eq!(fed(&mut world, animal, food), Ok(true));
        assert!(!world.contains(food));
        let brain = world.get::<&Brain>(animal).unwrap();
        assert_eq!(brain.state, AnimalState::Idle);
        assert!(!brain.is_being_herded);
    }

    #[test]
    fn touch_freezes_and_penalizes_once() {
        let mut world = hecs::World::new();
        let (animal, effects) = spawn_animal(
            &mut world,
            AnimalConfig {
                freeze_penalty: -50,
                freeze_duration: 5.0,
                ..quiet()
            },
        );
        let player = spawn_player(&mut world, Vec3::ZERO);
        let mut ledger = ScoreLedger::new();
        ledger.add_points(100);

        assert_eq!(player_touched(&mut world, &mut ledger, animal, player), Ok(true));
        assert_eq!(ledger.total_points(), 50);
        assert!(!world.get::<&Freezable>(player).unwrap().movement_enabled);
        assert_eq!(effects.cues.lock().unwrap().as_slice(), [cues::TOUCH.to_string()]);

        assert_eq!(player_touched(&mut world, &mut ledger, animal, player), Ok(false));
        assert_eq!(ledger.total_points(), 50);

        for _ in 0..9 {
            freeze::update(&mut world, 0.5);
            assert!(!world.get::<&Freezable>(player).unwrap().movement_enabled);
        }
        freeze::update(&mut world, 0.5);
        assert!(world.get::<&Freezable>(player).unwrap().movement_enabled);
    }

    #[test]
    fn herd_command_skips_already_herded() {
        let mut world = hecs::World::new();
        let (a, _) = spawn_animal(&mut world, quiet());
        let (b, _) = spawn_animal(&mut world, quiet());
        let player = spawn_player(&mut world, Vec3::new(0.0, 0.0, 10.0));
        let herding = HerdingConfig::default();

        assert_eq!(herd_all(&mut world, player, &herding), Ok(2));
        assert_eq!(herd_all(&mut world, player, &herding), Ok(0));
        for animal in [a, b] {
            let brain = world.get::<&Brain>(animal).unwrap();
            assert_eq!(brain.state, AnimalState::Herded);
            assert!(!brain.is_being_herded);
            assert_eq!(brain.target, Some(Vec3::new(0.0, 0.0, 7.0)));
        }
    }

    #[test]
    fn feeding_a_commanded_animal_marks_it_without_restart() {
        let mut world = hecs::World::new();
        let (animal, _) = spawn_animal(&mut world, quiet());
        let player = spawn_player(&mut world, Vec3::ZERO);
        herd_all(&mut world, player, &HerdingConfig::default()).unwrap();
        let timer_before = world.get::<&Brain>(animal).unwrap().timer;

        let food = world.spawn((Position(Vec3::ZERO), Food { thrown_by: Some(player) }));
        assert_eq!(fed(&mut world, animal, food), Ok(true));
        let brain = world.get::<&Brain>(animal).unwrap();
        assert!(brain.is_being_herded);
        assert_eq!(brain.timer, timer_before);
    }

    #[test]
    fn wrong_entities_are_rejected() {
        let mut world = hecs::World::new();
        let (animal, _) = spawn_animal(&mut world, quiet());
        let rock = world.spawn((Position(Vec3::ZERO),));
        let mut ledger = ScoreLedger::new();
        assert_eq!(
            player_touched(&mut world, &mut ledger, rock, rock),
            Err(EventError::NotAnAnimal(rock))
        );
        assert_eq!(
            player_touched(&mut world, &mut ledger, animal, rock),
            Err(EventError::NotAPlayer(rock))
        );
        assert_eq!(fed(&mut world, animal, rock), Err(EventError::NotFood(rock)));
        assert_eq!(
            herd_all(&mut world, rock, &HerdingConfig::default()),
            Err(EventError::NotAPlayer(rock))
        );
    }
}
