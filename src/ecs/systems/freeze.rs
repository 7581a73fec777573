//! Scoped capability leases on players. Acquiring a lease disables the
//! player's capabilities; every exit path restores the saved values.

use crate::ecs::components::{Freezable, FreezeLease};
use crate::error::EventError;
use crate::timer::StateTimer;

/// Freeze `player` for `duration` seconds. Returns `Ok(false)` if the
/// player already holds a lease.
pub fn acquire(
    world: &mut hecs::World,
    player: hecs::Entity,
    frozen_by: hecs::Entity,
    duration: f32,
) -> Result<bool, EventError> {
    if is_frozen(world, player) {
        return Ok(false);
    }
    let saved = {
        let mut caps = world
            .get::<&mut Freezable>(player)
            .map_err(|_| EventError::NotAPlayer(player))?;
        let saved = *caps;
        *caps = Freezable::FROZEN;
        saved
    };
    let lease = FreezeLease {
        saved,
        timer: StateTimer::start(duration),
        frozen_by,
    };
    world
        .insert_one(player, lease)
        .map_err(|_| EventError::NotAPlayer(player))?;
    Ok(true)
}

pub fn is_frozen(world: &hecs::World, player: hecs::Entity) -> bool {
    world.get::<&FreezeLease>(player).is_ok()
}

/// Tick leases and release the expired ones.
pub fn update(world: &mut hecs::World, dt: f32) -> usize {
    let mut expired = Vec::new();
    for (entity, lease) in world.query_mut::<&mut FreezeLease>() {
        lease.timer.tick(dt);
        if lease.timer.expired() {
            expired.push(entity);
        }
    }
    for &player in &expired {
        release(world, player);
        log::info!("Player {player:?} is no longer frozen");
    }
    expired.len()
}

/// End a lease early, restoring the saved capabilities. Returns false when
/// the player was not frozen.
pub fn release(world: &mut hecs::World, player: hecs::Entity) -> bool {
    let Ok(lease) = world.remove_one::<FreezeLease>(player) else {
        return false;
    };
    if let Ok(mut caps) = world.get::<&mut Freezable>(player) {
        *caps = lease.saved;
    }
    true
}

/// Cancel every outstanding lease (level teardown).
pub fn release_all(world: &mut hecs::World) -> usize {
    let players: Vec<_> = world
        .query::<&FreezeLease>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    players.into_iter().filter(|&p| release(world, p)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_restores_exact_capabilities() {
        let mut world = hecs::World::new();
        let custom = Freezable {
            movement_enabled: true,
            input_enabled: false,
            kinematic: true,
        };
        let player = world.spawn((custom,));
        let animal = world.spawn(());

        assert_eq!(acquire(&mut world, player, animal, 1.0), Ok(true));
        assert_eq!(*world.get::<&Freezable>(player).unwrap(), Freezable::FROZEN);

        update(&mut world, 0.5);
        assert!(is_frozen(&world, player));
        update(&mut world, 0.5);
        assert!(!is_frozen(&world, player));
        assert_eq!(*world.get::<&Freezable>(player).unwrap(), custom);
    }

    #[test]
    fn second_acquire_is_noop() {
        let mut world = hecs::World::new();
        let player = world.spawn((Freezable::default(),));
        let animal = world.spawn(());
        assert_eq!(acquire(&mut world, player, animal, 5.0), Ok(true));
        update(&mut world, 4.0);
        assert_eq!(acquire(&mut world, player, animal, 5.0), Ok(false));
        update(&mut world, 1.0);
        assert!(!is_frozen(&world, player));
    }

    #[test]
    fn cancellation_restores_like_completion() {
        let mut world = hecs::World::new();
        let a = world.spawn((Freezable::default(),));
        let b = world.spawn((Freezable::default(),));
        let animal = world.spawn(());
        acquire(&mut world, a, animal, 5.0).unwrap();
        acquire(&mut world, b, animal, 5.0).unwrap();

        assert_eq!(release_all(&mut world), 2);
        assert_eq!(*world.get::<&Freezable>(a).unwrap(), Freezable::default());
        assert_eq!(*world.get::<&Freezable>(b).unwrap(), Freezable::default());
        assert!(!release(&mut world, a));
    }

    #[test]
    fn non_player_is_rejected() {
        let mut world = hecs::World::new();
        let rock = world.spawn(());
        assert_eq!(
            acquire(&mut world, rock, rock, 1.0),
            Err(EventError::NotAPlayer(rock))
        );
    }
}
