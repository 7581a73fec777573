//! Owns the world and everything a tick needs. Hosts drive it with
//! [`Simulation::tick`] and forward their own events through the mediator
//! methods.

use glam::{Vec2, Vec3};
use log::info;

use crate::animal::{self, AnimalBuilder};
use crate::collab::SpatialQuery;
use crate::config::{GameConfig, MessKind};
use crate::ecs::components::{Facing, Food, Freezable, Knockable, Player, Position, Velocity};
use crate::ecs::systems::behavior::PendingMess;
use crate::ecs::systems::{self, freeze, interaction, mess, SystemBuffers, TickReport};
use crate::error::{EventError, SpawnError};
use crate::match_clock::{MatchClock, MatchEvent, MatchPhase};
use crate::score::ScoreLedger;
use crate::timer::SimClock;

pub struct Simulation {
    pub world: hecs::World,
    pub ledger: ScoreLedger,
    clock: SimClock,
    rng: fastrand::Rng,
    spatial: Box<dyn SpatialQuery>,
    config: GameConfig,
    match_clock: MatchClock,
    bufs: SystemBuffers,
    totals: TickReport,
}

impl Simulation {
    pub fn new(config: GameConfig, spatial: Box<dyn SpatialQuery>, seed: u64) -> Self {
        let config = GameConfig {
            animal: config.animal.validated(),
            ..config
        };
        Self {
            world: hecs::World::new(),
            ledger: ScoreLedger::new(),
            clock: SimClock::new(),
            rng: fastrand::Rng::with_seed(seed),
            spatial,
            match_clock: MatchClock::new(&config.match_rules),
            config,
            bufs: SystemBuffers::default(),
            totals: TickReport::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    pub fn match_clock(&self) -> &MatchClock {
        &self.match_clock
    }

    /// Running totals of everything reported by [`Simulation::step`].
    pub fn totals(&self) -> TickReport {
        self.totals
    }

    // -- Spawning ----------------------------------------------------------

    pub fn spawn_player(&mut self, pos: Vec3, facing: Vec3) -> hecs::Entity {
        self.world
            .spawn((Position(pos), Facing(facing), Player, Freezable::default()))
    }

    /// Move a player. Frozen players stay put.
    pub fn set_player_pose(&mut self, player: hecs::Entity, pos: Vec3, facing: Vec3) -> bool {
        let Ok((p, f, caps)) = self
            .world
            .query_one_mut::<(&mut Position, &mut Facing, &Freezable)>(player)
        else {
            return false;
        };
        if !caps.movement_enabled {
            return false;
        }
        p.0 = pos;
        f.0 = facing;
        true
    }

    pub fn spawn_food(&mut self, pos: Vec3, thrown_by: Option<hecs::Entity>) -> hecs::Entity {
        self.world.spawn((Position(pos), Food { thrown_by }))
    }

    pub fn spawn_knockable(&mut self, pos: Vec3) -> hecs::Entity {
        self.world.spawn((Position(pos), Velocity(Vec3::ZERO), Knockable))
    }

    /// Place a mess directly, outside of any animal's doing.
    pub fn spawn_mess(&mut self, pos: Vec3, kind: MessKind) -> hecs::Entity {
        let pending = PendingMess {
            pos,
            kind,
            spawned_by: None,
        };
        mess::spawn_mess(&mut self.world, &pending)
    }

    pub fn spawn_animal(&mut self, builder: AnimalBuilder) -> Result<hecs::Entity, SpawnError> {
        let now = self.clock.now();
        builder.spawn(&mut self.world, &mut self.rng, now)
    }

    /// Spawn `count` animals with the configured defaults and headless
    /// collaborators, scattered over `min..max`.
    pub fn spawn_zoo(
        &mut self,
        count: usize,
        min: Vec2,
        max: Vec2,
        tick_dt: f32,
    ) -> Result<Vec<hecs::Entity>, SpawnError> {
        let now = self.clock.now();
        animal::spawn_zoo(
            &mut self.world,
            count,
            min,
            max,
            &self.config.animal,
            tick_dt,
            &mut self.rng,
            now,
        )
    }

    // -- Ticking -----------------------------------------------------------

    /// Run every system once regardless of match phase.
    pub fn step(&mut self, dt: f32) -> TickReport {
        self.clock.advance(dt);
        let report = systems::tick(
            &mut self.world,
            dt,
            self.clock.now(),
            self.spatial.as_mut(),
            &mut self.ledger,
            &mut self.rng,
            &self.config.match_rules,
            &mut self.bufs,
        );
        self.totals += report;
        report
    }

    /// Advance the match. The world only moves while the match is running.
    pub fn tick(&mut self, dt: f32) -> Option<MatchEvent> {
        match self.match_clock.phase() {
            MatchPhase::Countdown => {
                let event = self.match_clock.update(dt, self.ledger.total_points());
                if event == Some(MatchEvent::Started) {
                    self.ledger.reset();
                    info!("Match started ({:.0}s)", self.match_clock.remaining());
                }
                event
            }
            MatchPhase::Running => {
                self.step(dt);
                let event = self.match_clock.update(dt, self.ledger.total_points());
                if let Some(MatchEvent::Ended(outcome)) = event {
                    let (freezes, cleanups) = self.end_level();
                    info!(
                        "Match over: {} with {} points ({freezes} freezes, {cleanups} cleanups cancelled)",
                        outcome.label(),
                        self.ledger.total_points()
                    );
                }
                event
            }
            MatchPhase::Over(_) => None,
        }
    }

    /// Cancel every scoped operation. Returns (freezes, cleanups) released.
    pub fn end_level(&mut self) -> (usize, usize) {
        systems::cancel_scoped(&mut self.world)
    }

    // -- Events ------------------------------------------------------------

    pub fn player_touched(
        &mut self,
        animal: hecs::Entity,
        player: hecs::Entity,
    ) -> Result<bool, EventError> {
        interaction::player_touched(&mut self.world, &mut self.ledger, animal, player)
    }

    pub fn feed(&mut self, animal: hecs::Entity, food: hecs::Entity) -> Result<bool, EventError> {
        interaction::fed(&mut self.world, animal, food)
    }

    pub fn herd_all(&mut self, player: hecs::Entity) -> Result<usize, EventError> {
        interaction::herd_all(&mut self.world, player, &self.config.herding)
    }

    pub fn interact(&mut self, player: hecs::Entity) -> Result<Option<hecs::Entity>, EventError> {
        mess::interact(
            &mut self.world,
            player,
            self.config.match_rules.mess_interact_range,
        )
    }

    pub fn cancel_cleanup(&mut self, mess: hecs::Entity) -> Result<bool, EventError> {
        mess::cancel_cleanup(&mut self.world, mess)
    }

    pub fn clean_instantly(&mut self, mess: hecs::Entity) -> Result<bool, EventError> {
        mess::clean_instantly(&mut self.world, &mut self.ledger, mess)
    }

    pub fn is_frozen(&self, player: hecs::Entity) -> bool {
        freeze::is_frozen(&self.world, player)
    }
}
