use std::path::PathBuf;
use std::time::Duration;

use glam::{Vec2, Vec3};
use instant::Instant;

use junkle::collab::headless::FlatGround;
use junkle::ecs::components::{Brain, CleanupState, MessObject, Position};
use junkle::{GameConfig, MatchEvent, Outcome, Simulation};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log stats (wall-clock seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

const ANIMAL_COUNT: usize = 12;
const CLEANER_COUNT: usize = 3;
const PROP_COUNT: usize = 8;
/// Half extent of the square field.
const FIELD_HALF: f32 = 20.0;
/// Animals and props are kept this far from the field edge.
const SPAWN_MARGIN: f32 = 2.0;

const CLEANER_SPEED: f32 = 4.0;
/// Cleaners stop walking this close to their mess.
const CLEANER_REACH: f32 = 1.0;
/// Seconds between scripted herd commands.
const HERD_INTERVAL: f32 = 25.0;
/// Seconds between scripted food throws.
const FOOD_INTERVAL: f32 = 12.0;

#[derive(Debug, Default)]
pub struct Options {
    pub config_path: Option<PathBuf>,
    /// Run ticks back to back instead of pacing to wall-clock time.
    pub fast: bool,
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

struct RunStats {
    last_log_time: Instant,
    ticks_since_log: u32,
}

impl RunStats {
    fn new() -> Self {
        Self {
            last_log_time: Instant::now(),
            ticks_since_log: 0,
        }
    }

    fn record_tick(&mut self, sim: &Simulation) {
        self.ticks_since_log += 1;
        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed < STATS_LOG_INTERVAL {
            return;
        }

        let messes = sim.world.query::<&MessObject>().iter().count();
        let totals = sim.totals();
        log::info!(
            "t={:.0}s | {:.0}s left | score: {} | messes on floor: {} | made: {} | cleaned: {} | touches: {} | feeds: {} | tps: {:.0}",
            sim.now(),
            sim.match_clock().remaining(),
            sim.ledger.total_points(),
            messes,
            totals.messes_spawned,
            totals.messes_cleaned,
            totals.touches,
            totals.feeds,
            self.ticks_since_log as f64 / elapsed,
        );
        self.last_log_time = Instant::now();
        self.ticks_since_log = 0;
    }
}

// ---------------------------------------------------------------------------
// Scripted cleaners
// ---------------------------------------------------------------------------

struct Cleaner {
    entity: hecs::Entity,
    pos: Vec3,
    facing: Vec3,
    target: Option<hecs::Entity>,
}

/// Nearest mess nobody is cleaning yet.
fn nearest_free_mess(world: &hecs::World, from: Vec3, claimed: &[hecs::Entity]) -> Option<hecs::Entity> {
    world
        .query::<(&Position, &MessObject)>()
        .iter()
        .filter(|(e, (_, m))| m.state != CleanupState::BeingCleaned && !claimed.contains(e))
        .map(|(e, (pos, _))| (e, pos.0.distance_squared(from)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| e)
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    sim: Simulation,
    cleaners: Vec<Cleaner>,

    // Fixed timestep
    accumulator: f64,
    tick_count: u64,

    herd_timer: f32,
    food_timer: f32,

    stats: RunStats,
}

impl App {
    fn new(options: &Options) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match &options.config_path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                GameConfig::load(path)?
            }
            None => GameConfig::default(),
        };
        let seed = options.seed.unwrap_or_else(|| fastrand::u64(..));
        log::info!("Seed: {seed}");

        let ground = FlatGround::new(Vec2::splat(-FIELD_HALF), Vec2::splat(FIELD_HALF), 0.0);
        let mut sim = Simulation::new(config, Box::new(ground), seed);

        let inner = FIELD_HALF - SPAWN_MARGIN;
        let animals = sim.spawn_zoo(
            ANIMAL_COUNT,
            Vec2::splat(-inner),
            Vec2::splat(inner),
            TICK_RATE as f32,
        )?;
        log::info!("Spawned {} animals", animals.len());

        for _ in 0..PROP_COUNT {
            let x = (sim.rng().f32() * 2.0 - 1.0) * inner;
            let z = (sim.rng().f32() * 2.0 - 1.0) * inner;
            sim.spawn_knockable(Vec3::new(x, 0.0, z));
        }

        let cleaners = (0..CLEANER_COUNT)
            .map(|i| {
                let angle = i as f32 / CLEANER_COUNT as f32 * std::f32::consts::TAU;
                let pos = Vec3::new(angle.cos(), 0.0, angle.sin()) * (FIELD_HALF * 0.5);
                let facing = -pos.normalize_or_zero();
                Cleaner {
                    entity: sim.spawn_player(pos, facing),
                    pos,
                    facing,
                    target: None,
                }
            })
            .collect();

        Ok(Self {
            sim,
            cleaners,
            accumulator: 0.0,
            tick_count: 0,
            herd_timer: HERD_INTERVAL,
            food_timer: FOOD_INTERVAL,
            stats: RunStats::new(),
        })
    }

    /// Run fixed-timestep simulation ticks. Returns the outcome once the
    /// match is over.
    fn run_fixed_update(&mut self, dt: f64) -> Option<Outcome> {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE {
            let dt = TICK_RATE as f32;
            if self.sim.match_clock().is_running() {
                self.drive_cleaners(dt);
                self.script_events(dt);
            }
            let event = self.sim.tick(dt);

            for change in self.sim.ledger.drain_changes() {
                log::debug!("Score {:+} -> {}", change.delta, change.total);
            }

            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
            self.stats.record_tick(&self.sim);

            if let Some(MatchEvent::Ended(outcome)) = event {
                return Some(outcome);
            }
        }
        None
    }

    /// Walk each cleaner to the nearest unclaimed mess and clean it.
    fn drive_cleaners(&mut self, dt: f32) {
        for i in 0..self.cleaners.len() {
            let entity = self.cleaners[i].entity;
            if self.sim.is_frozen(entity) {
                continue;
            }

            let target_alive = self.cleaners[i]
                .target
                .is_some_and(|m| self.sim.world.contains(m));
            if !target_alive {
                let claimed: Vec<_> = self.cleaners.iter().filter_map(|c| c.target).collect();
                self.cleaners[i].target =
                    nearest_free_mess(&self.sim.world, self.cleaners[i].pos, &claimed);
            }
            let Some(mess) = self.cleaners[i].target else {
                continue;
            };
            let Ok(mess_pos) = self.sim.world.get::<&Position>(mess).map(|p| p.0) else {
                continue;
            };

            let cleaner = &mut self.cleaners[i];
            let to_mess = Vec3::new(mess_pos.x - cleaner.pos.x, 0.0, mess_pos.z - cleaner.pos.z);
            let distance = to_mess.length();
            if distance > CLEANER_REACH {
                let step = (CLEANER_SPEED * dt).min(distance - CLEANER_REACH);
                cleaner.facing = to_mess / distance;
                cleaner.pos += cleaner.facing * step;
                let (pos, facing) = (cleaner.pos, cleaner.facing);
                self.sim.set_player_pose(entity, pos, facing);
                continue;
            }

            let busy = self
                .sim
                .world
                .get::<&MessObject>(mess)
                .is_ok_and(|m| m.state == CleanupState::BeingCleaned);
            if !busy {
                match self.sim.interact(entity) {
                    Ok(Some(cleaning)) => self.cleaners[i].target = Some(cleaning),
                    Ok(None) => {}
                    Err(e) => log::warn!("Cleaner interact failed: {e}"),
                }
            }
        }
    }

    /// Periodic herd commands and food throws from random cleaners.
    fn script_events(&mut self, dt: f32) {
        self.herd_timer -= dt;
        if self.herd_timer <= 0.0 {
            self.herd_timer = HERD_INTERVAL;
            let idx = self.sim.rng().usize(0..self.cleaners.len());
            let player = self.cleaners[idx].entity;
            if let Err(e) = self.sim.herd_all(player) {
                log::warn!("Herd command failed: {e}");
            }
        }

        self.food_timer -= dt;
        if self.food_timer <= 0.0 {
            self.food_timer = FOOD_INTERVAL;
            let idx = self.sim.rng().usize(0..self.cleaners.len());
            let thrower = &self.cleaners[idx];
            let (from, player) = (thrower.pos, thrower.entity);

            let nearest = self
                .sim
                .world
                .query::<(&Position, &Brain)>()
                .iter()
                .filter(|(_, (_, brain))| !brain.is_being_herded)
                .map(|(_, (pos, _))| pos.0)
                .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)));
            if let Some(at) = nearest {
                self.sim.spawn_food(at, Some(player));
                log::info!("Player {player:?} threw food at {at:?}");
            }
        }
    }
}

/// Entry point: build the field and run the match to completion.
pub fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(&options)?;
    let mut last_frame_time = Instant::now();

    let outcome = loop {
        let dt = if options.fast {
            TICK_RATE
        } else {
            std::thread::sleep(Duration::from_secs_f64(TICK_RATE));
            let now = Instant::now();
            let dt = now.duration_since(last_frame_time).as_secs_f64();
            last_frame_time = now;
            dt
        };

        if let Some(outcome) = app.run_fixed_update(dt) {
            break outcome;
        }
    };

    log::info!(
        "{} | final score: {} | {} ticks | {:.0}s simulated",
        outcome.label(),
        app.sim.ledger.total_points(),
        app.tick_count,
        app.sim.now(),
    );
    Ok(())
}
