//! Mess lifecycle: spawn, player proximity, timed cleanup, and scoring.
//!
//! Cleanup is a scoped operation. It completes after `cleanup_duration`
//! with the player still in range, or is cancelled (player left, explicit
//! cancel, level end) and reverts without touching the ledger.

use glam::Vec3;
use log::{debug, info};

use super::behavior::{planar_distance, PendingMess};
use crate::ecs::components::{
    CleanupState, Freezable, MessObject, Player, PlayerContact, Position,
};
use crate::error::EventError;
use crate::score::ScoreLedger;
use crate::timer::StateTimer;

pub fn spawn_mess(world: &mut hecs::World, pending: &PendingMess) -> hecs::Entity {
    let mess = MessObject {
        kind: pending.kind.name.clone(),
        points: pending.kind.points,
        cleanup_duration: pending.kind.cleanup_duration,
        state: CleanupState::Idle,
        contact: None,
        cleanup: StateTimer::start(pending.kind.cleanup_duration),
        spawned_by: pending.spawned_by,
    };
    debug!("Spawned {} at {:?}", mess.kind, pending.pos);
    world.spawn((Position(pending.pos), mess))
}

fn nearest_player(players: &[(hecs::Entity, Vec3)], pos: Vec3, range: f32) -> Option<PlayerContact> {
    players
        .iter()
        .map(|&(player, p)| PlayerContact {
            player,
            distance: planar_distance(pos, p),
        })
        .filter(|c| c.distance <= range)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Track players near each mess and advance cleanups. Finished messes are
/// scored and despawned. Returns how many were cleaned this tick.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    ledger: &mut ScoreLedger,
    interact_range: f32,
) -> usize {
    let players: Vec<(hecs::Entity, Vec3)> = world
        .query::<(&Position, &Player)>()
        .iter()
        .map(|(e, (pos, _))| (e, pos.0))
        .collect();

    let mut cleaned = Vec::new();
    for (entity, (pos, mess)) in world.query_mut::<(&Position, &mut MessObject)>() {
        // Refresh the paired player's distance; None once gone or out of range.
        let paired = mess.contact.and_then(|c| {
            players
                .iter()
                .find(|(p, _)| *p == c.player)
                .map(|&(player, p)| PlayerContact {
                    player,
                    distance: planar_distance(pos.0, p),
                })
                .filter(|c| c.distance <= interact_range)
        });

        match mess.state {
            CleanupState::Idle => {
                if let Some(contact) = nearest_player(&players, pos.0, interact_range) {
                    mess.state = CleanupState::PlayerInRange;
                    mess.contact = Some(contact);
                }
            }
            CleanupState::PlayerInRange => {
                match paired.or_else(|| nearest_player(&players, pos.0, interact_range)) {
                    Some(contact) => mess.contact = Some(contact),
                    None => {
                        mess.state = CleanupState::Idle;
                        mess.contact = None;
                    }
                }
            }
            CleanupState::BeingCleaned => match paired {
                Some(contact) => {
                    mess.contact = Some(contact);
                    mess.cleanup.tick(dt);
                    if mess.cleanup.expired() {
                        mess.state = CleanupState::Cleaned;
                        cleaned.push((entity, mess.points, mess.kind.clone()));
                    }
                }
                None => {
                    info!("Cleanup of {} interrupted, player left", mess.kind);
                    mess.state = CleanupState::Idle;
                    mess.contact = None;
                    mess.cleanup = StateTimer::start(mess.cleanup_duration);
                }
            },
            CleanupState::Cleaned => cleaned.push((entity, mess.points, mess.kind.clone())),
        }
    }

    for &(entity, points, ref kind) in &cleaned {
        ledger.add_points(points);
        let _ = world.despawn(entity);
        info!("Cleaned up {kind} (+{points})");
    }
    cleaned.len()
}

/// A player pressed interact: start cleaning the nearest mess in range.
/// Frozen players cannot interact.
pub fn interact(
    world: &mut hecs::World,
    player: hecs::Entity,
    interact_range: f32,
) -> Result<Option<hecs::Entity>, EventError> {
    let player_pos = {
        if world.get::<&Player>(player).is_err() {
            return Err(EventError::NotAPlayer(player));
        }
        if world
            .get::<&Freezable>(player)
            .is_ok_and(|caps| !caps.input_enabled)
        {
            return Ok(None);
        }
        world
            .get::<&Position>(player)
            .map_err(|_| EventError::NotAPlayer(player))?
            .0
    };

    let target = world
        .query::<(&Position, &MessObject)>()
        .iter()
        .filter(|(_, (_, m))| matches!(m.state, CleanupState::Idle | CleanupState::PlayerInRange))
        .map(|(e, (pos, _))| (e, planar_distance(pos.0, player_pos)))
        .filter(|&(_, d)| d <= interact_range)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let Some((mess, distance)) = target else {
        return Ok(None);
    };

    if let Ok(mut obj) = world.get::<&mut MessObject>(mess) {
        obj.state = CleanupState::PlayerInRange;
        obj.contact = Some(PlayerContact { player, distance });
    }
    Ok(start_cleanup(world, mess)?.then_some(mess))
}

/// Begin cleaning a mess that has a player in range.
pub fn start_cleanup(world: &mut hecs::World, mess: hecs::Entity) -> Result<bool, EventError> {
    let mut obj = world
        .get::<&mut MessObject>(mess)
        .map_err(|_| EventError::NotAMess(mess))?;
    if obj.state != CleanupState::PlayerInRange {
        return Ok(false);
    }
    obj.state = CleanupState::BeingCleaned;
    obj.cleanup = StateTimer::start(obj.cleanup_duration);
    info!("Cleaning {} ({:.1}s)", obj.kind, obj.cleanup_duration);
    Ok(true)
}

/// Abort an in-progress cleanup. The mess goes back to `PlayerInRange`
/// (demoted to `Idle` on the next update if the player is gone).
pub fn cancel_cleanup(world: &mut hecs::World, mess: hecs::Entity) -> Result<bool, EventError> {
    let mut obj = world
        .get::<&mut MessObject>(mess)
        .map_err(|_| EventError::NotAMess(mess))?;
    if obj.state != CleanupState::BeingCleaned {
        return Ok(false);
    }
    obj.state = if obj.contact.is_some() {
        CleanupState::PlayerInRange
    } else {
        CleanupState::Idle
    };
    obj.cleanup = StateTimer::start(obj.cleanup_duration);
    debug!("Cleanup of {} cancelled", obj.kind);
    Ok(true)
}

/// Vacuum-style cleanup: score and remove immediately. Refused while a
/// timed cleanup is running.
pub fn clean_instantly(
    world: &mut hecs::World,
    ledger: &mut ScoreLedger,
    mess: hecs::Entity,
) -> Result<bool, EventError> {
    let (points, kind) = {
        let obj = world
            .get::<&MessObject>(mess)
            .map_err(|_| EventError::NotAMess(mess))?;
        if matches!(obj.state, CleanupState::BeingCleaned | CleanupState::Cleaned) {
            return Ok(false);
        }
        (obj.points, obj.kind.clone())
    };
    ledger.add_points(points);
    let _ = world.despawn(mess);
    info!("Vacuumed {kind} (+{points})");
    Ok(true)
}

/// Cancel every running cleanup (level teardown).
pub fn cancel_all(world: &mut hecs::World) -> usize {
    let running: Vec<_> = world
        .query::<&MessObject>()
        .iter()
        .filter(|(_, m)| m.state == CleanupState::BeingCleaned)
        .map(|(e, _)| e)
        .collect();
    running
        .into_iter()
        .filter(|&m| cancel_cleanup(world, m).unwrap_or(false))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MessKind;
    use crate::ecs::components::Facing;

    const RANGE: f32 = 2.0;

    fn setup() -> (hecs::World, hecs::Entity, hecs::Entity) {
        let mut world = hecs::World::new();
        let animal = world.spawn(());
        let mess = spawn_mess(
            &mut world,
            &PendingMess {
                pos: Vec3::ZERO,
                kind: MessKind {
                    name: "spilled_feed".into(),
                    points: 10,
                    cleanup_duration: 2.0,
                },
                spawned_by: Some(animal),
            },
        );
        let player = world.spawn((
            Position(Vec3::new(1.0, 0.0, 0.0)),
            Facing(Vec3::Z),
            Player,
            Freezable::default(),
        ));
        (world, mess, player)
    }

    fn state(world: &hecs::World, mess: hecs::Entity) -> CleanupState {
        world.get::<&MessObject>(mess).unwrap().state
    }

    #[test]
    fn completed_cleanup_scores_and_despawns() {
        let (mut world, mess, player) = setup();
        let mut ledger = ScoreLedger::new();

        update(&mut world, 0.5, &mut ledger, RANGE);
        assert_eq!(state(&world, mess), CleanupState::PlayerInRange);
        assert_eq!(interact(&mut world, player, RANGE), Ok(Some(mess)));

        for _ in 0..3 {
            assert_eq!(update(&mut world, 0.5, &mut ledger, RANGE), 0);
        }
        assert_eq!(update(&mut world, 0.5, &mut ledger, RANGE), 1);
        assert_eq!(ledger.total_points(), 10);
        assert!(!world.contains(mess));
    }

    #[test]
    fn cancelled_cleanup_leaves_mess_intact() {
        let (mut world, mess, player) = setup();
        let mut ledger = ScoreLedger::new();

        interact(&mut world, player, RANGE).unwrap();
        update(&mut world, 0.95, &mut ledger, RANGE);
        update(&mut world, 0.95, &mut ledger, RANGE);
        assert_eq!(cancel_cleanup(&mut world, mess), Ok(true));

        assert_eq!(ledger.total_points(), 0);
        assert_eq!(state(&world, mess), CleanupState::PlayerInRange);
        assert_eq!(world.get::<&MessObject>(mess).unwrap().cleanup.elapsed, 0.0);
    }

    #[test]
    fn leaving_range_reverts() {
        let (mut world, mess, player) = setup();
        let mut ledger = ScoreLedger::new();

        update(&mut world, 0.1, &mut ledger, RANGE);
        assert_eq!(state(&world, mess), CleanupState::PlayerInRange);
        world.get::<&mut Position>(player).unwrap().0 = Vec3::new(5.0, 0.0, 0.0);
        update(&mut world, 0.1, &mut ledger, RANGE);
        assert_eq!(state(&world, mess), CleanupState::Idle);

        world.get::<&mut Position>(player).unwrap().0 = Vec3::new(1.0, 0.0, 0.0);
        interact(&mut world, player, RANGE).unwrap();
        update(&mut world, 1.0, &mut ledger, RANGE);
        world.get::<&mut Position>(player).unwrap().0 = Vec3::new(5.0, 0.0, 0.0);
        update(&mut world, 1.0, &mut ledger, RANGE);
        assert_eq!(state(&world, mess), CleanupState::Idle);
        assert_eq!(ledger.total_points(), 0);
    }

    #[test]
    fn out_of_range_or_frozen_player_cannot_interact() {
        let (mut world, mess, player) = setup();
        world.get::<&mut Position>(player).unwrap().0 = Vec3::new(3.0, 0.0, 0.0);
        assert_eq!(interact(&mut world, player, RANGE), Ok(None));

        world.get::<&mut Position>(player).unwrap().0 = Vec3::ZERO;
        *world.get::<&mut Freezable>(player).unwrap() = Freezable::FROZEN;
        assert_eq!(interact(&mut world, player, RANGE), Ok(None));
        assert_eq!(state(&world, mess), CleanupState::Idle);
    }

    #[test]
    fn instant_clean_refused_mid_cleanup() {
        let (mut world, mess, player) = setup();
        let mut ledger = ScoreLedger::new();
        interact(&mut world, player, RANGE).unwrap();
        assert_eq!(clean_instantly(&mut world, &mut ledger, mess), Ok(false));

        assert_eq!(cancel_all(&mut world), 1);
        assert_eq!(clean_instantly(&mut world, &mut ledger, mess), Ok(true));
        assert_eq!(ledger.total_points(), 10);
        assert!(!world.contains(mess));
        assert_eq!(
            clean_instantly(&mut world, &mut ledger, mess),
            Err(EventError::NotAMess(mess))
        );
    }
}
