use glam::{Vec2, Vec3};
use log::{debug, info, warn};

use crate::collab::{cues, Classifier, SpatialQuery};
use crate::config::{AnimalConfig, MessKind};
use crate::ecs::components::{
    AnimalName, AnimalState, Brain, Effects, Facing, HerdFollow, Home, Player, Position,
};
use crate::timer::{chance, inside_unit_circle, range_f32, StateTimer};

/// A wander target closer than this counts as reached.
pub const ARRIVAL_DISTANCE: f32 = 1.0;
/// Dwell range shared by MakingMess and Distracted (seconds).
const DWELL_MIN: f32 = 2.0;
const DWELL_MAX: f32 = 4.0;
/// Raycast fallback for wander targets starts this far above the candidate.
const RAYCAST_HEIGHT: f32 = 10.0;
const RAYCAST_DISTANCE: f32 = 20.0;
/// Mess spawn points snap to walkable ground within this radius.
const MESS_SNAP_RADIUS: f32 = 2.0;

/// A mess to spawn once the world is no longer borrowed.
#[derive(Debug, Clone)]
pub struct PendingMess {
    pub pos: Vec3,
    pub kind: MessKind,
    pub spawned_by: Option<hecs::Entity>,
}

/// A prop to shove away from a mess origin.
#[derive(Debug, Clone, Copy)]
pub struct PendingKnock {
    pub prop: hecs::Entity,
    pub origin: Vec3,
}

/// Pre-allocated, reused each tick.
#[derive(Default)]
pub struct BehaviorBuffers {
    pub messes: Vec<PendingMess>,
    pub knocks: Vec<PendingKnock>,
    players: Vec<(hecs::Entity, Vec3, Vec3)>,
}

impl BehaviorBuffers {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advance every animal's state timer and apply at most one transition per
/// animal. Messes and knocks are queued in `bufs`.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    now: f64,
    spatial: &dyn SpatialQuery,
    rng: &mut fastrand::Rng,
    bufs: &mut BehaviorBuffers,
) {
    let BehaviorBuffers {
        messes,
        knocks,
        players,
    } = bufs;

    players.clear();
    for (entity, (pos, facing, _)) in world.query::<(&Position, &Facing, &Player)>().iter() {
        players.push((entity, pos.0, facing.0));
    }

    for (entity, (brain, config, home, pos, effects, name)) in world.query_mut::<(
        &mut Brain,
        &AnimalConfig,
        &Home,
        &Position,
        &mut Effects,
        &AnimalName,
    )>() {
        brain.timer.tick(dt);

        match brain.state {
            AnimalState::Idle => {
                if brain.timer.expired() {
                    let ctx = MessContext {
                        entity,
                        name: &name.0,
                        pos: pos.0,
                        spatial,
                        messes: &mut *messes,
                        knocks: &mut *knocks,
                    };
                    leave_idle(brain, config, home.0, ctx, rng, effects);
                }
            }
            AnimalState::Wandering => {
                let arrived = brain
                    .target
                    .map_or(true, |t| planar_distance(pos.0, t) < ARRIVAL_DISTANCE);
                if brain.timer.expired() || arrived {
                    enter_idle(brain, config, rng);
                }
            }
            AnimalState::MakingMess => {
                if brain.timer.expired() {
                    enter_idle(brain, config, rng);
                }
            }
            AnimalState::Distracted => {
                if brain.timer.expired() {
                    brain.last_distraction_at = now;
                    enter_idle(brain, config, rng);
                    debug!("{} calmed down", name.0);
                }
            }
            AnimalState::Herded => {
                refresh_follow_point(brain, players);
                if brain.timer.expired() {
                    brain.is_being_herded = false;
                    enter_idle(brain, config, rng);
                    info!("{} stopped following", name.0);
                }
            }
        }
    }
}

struct MessContext<'a> {
    entity: hecs::Entity,
    name: &'a str,
    pos: Vec3,
    spatial: &'a dyn SpatialQuery,
    messes: &'a mut Vec<PendingMess>,
    knocks: &'a mut Vec<PendingKnock>,
}

fn leave_idle(
    brain: &mut Brain,
    config: &AnimalConfig,
    home: Vec3,
    ctx: MessContext<'_>,
    rng: &mut fastrand::Rng,
    effects: &mut Effects,
) {
    if config.can_cause_messes && chance(rng, config.mess_chance) {
        enter_making_mess(brain, config, ctx, rng, effects);
        return;
    }
    if !enter_wandering(brain, config, home, ctx.spatial, rng) {
        debug!("{}: no walkable wander target, staying idle", ctx.name);
        enter_idle(brain, config, rng);
    }
}

/// Reset per-state fields and start a new timed state.
fn enter(brain: &mut Brain, state: AnimalState, deadline: f32) {
    brain.state = state;
    brain.timer = StateTimer::start(deadline);
    brain.target = None;
    brain.threat = None;
    brain.is_running = false;
    brain.herd = None;
}

pub(crate) fn enter_idle(brain: &mut Brain, config: &AnimalConfig, rng: &mut fastrand::Rng) {
    let idle = range_f32(rng, config.idle_time_min, config.idle_time_max);
    enter(brain, AnimalState::Idle, idle);
}

/// Pick a wander target around `home`. Returns false, leaving `brain`
/// untouched, when the spatial query finds no walkable point.
pub(crate) fn enter_wandering(
    brain: &mut Brain,
    config: &AnimalConfig,
    home: Vec3,
    spatial: &dyn SpatialQuery,
    rng: &mut fastrand::Rng,
) -> bool {
    let offset = inside_unit_circle(rng) * config.wander_radius;
    let candidate = home + Vec3::new(offset.x, 0.0, offset.y);
    let target = spatial
        .sample_walkable_point(candidate, config.wander_radius)
        .or_else(|| spatial.raycast_down(candidate + Vec3::Y * RAYCAST_HEIGHT, RAYCAST_DISTANCE));
    let Some(target) = target else {
        return false;
    };

    let running = chance(rng, config.run_chance);
    let move_time = range_f32(rng, config.move_time_min, config.move_time_max);
    enter(brain, AnimalState::Wandering, move_time);
    brain.target = Some(target);
    brain.is_running = running;
    true
}

fn enter_making_mess(
    brain: &mut Brain,
    config: &AnimalConfig,
    ctx: MessContext<'_>,
    rng: &mut fastrand::Rng,
    effects: &mut Effects,
) {
    enter(brain, AnimalState::MakingMess, range_f32(rng, DWELL_MIN, DWELL_MAX));
    brain.target = Some(ctx.pos);

    if config.mess_kinds.is_empty() {
        warn!("{} tried to make a mess but has no mess kinds", ctx.name);
    } else {
        let lo = config.min_mess_count.min(config.max_mess_count);
        let hi = config.min_mess_count.max(config.max_mess_count);
        let count = rng.u32(lo..=hi);
        for _ in 0..count {
            let kind = config.mess_kinds[rng.usize(0..config.mess_kinds.len())].clone();
            let offset = inside_unit_circle(rng) * config.mess_spread_radius;
            let candidate = ctx.pos + Vec3::new(offset.x, 0.0, offset.y);
            let pos = ctx
                .spatial
                .sample_walkable_point(candidate, MESS_SNAP_RADIUS)
                .unwrap_or(ctx.pos);
            ctx.messes.push(PendingMess {
                pos,
                kind,
                spawned_by: Some(ctx.entity),
            });
        }
        info!("{} is causing a mess ({} pieces)", ctx.name, count);
    }

    for prop in ctx
        .spatial
        .overlap_sphere(ctx.pos, config.mess_radius, Classifier::Knockable)
    {
        ctx.knocks.push(PendingKnock {
            prop,
            origin: ctx.pos,
        });
    }
    effects.cue(cues::DISTRACTION);
}

/// Enter `Herded` toward `follow_point`. No-op when already herded.
pub fn start_herding(
    brain: &mut Brain,
    follow_point: Vec3,
    duration: f32,
    follow: HerdFollow,
) -> bool {
    if brain.state == AnimalState::Herded {
        return false;
    }
    enter(brain, AnimalState::Herded, duration);
    brain.target = Some(follow_point);
    brain.herd = Some(follow);
    true
}

/// Preempt the current state with `Distracted`. Herded animals and animals
/// already distracted are left alone.
pub fn force_distraction(
    brain: &mut Brain,
    threat: Option<Vec3>,
    rng: &mut fastrand::Rng,
    effects: &mut Effects,
) -> bool {
    if matches!(brain.state, AnimalState::Distracted | AnimalState::Herded) {
        return false;
    }
    enter(brain, AnimalState::Distracted, range_f32(rng, DWELL_MIN, DWELL_MAX));
    brain.threat = threat;
    effects.cue(cues::SOUNDS[rng.usize(0..cues::SOUNDS.len())]);
    effects.cue(cues::DISTRACTION);
    true
}

/// Point `distance` behind a player on the ground plane.
pub fn follow_point(pos: Vec3, facing: Vec3, distance: f32) -> Vec3 {
    let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    pos - forward * distance
}

fn refresh_follow_point(brain: &mut Brain, players: &[(hecs::Entity, Vec3, Vec3)]) {
    let Some(HerdFollow {
        player: Some(player),
        follow_distance,
    }) = brain.herd
    else {
        return;
    };
    if let Some(&(_, pos, facing)) = players.iter().find(|(e, _, _)| *e == player) {
        brain.target = Some(follow_point(pos, facing, follow_distance));
    }
}

pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}
