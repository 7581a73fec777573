pub mod behavior;
pub mod distraction;
pub mod freeze;
pub mod interaction;
pub mod mess;
pub mod movement;
pub mod props;
pub mod triggers;

use crate::collab::SpatialQuery;
use crate::config::MatchConfig;
use crate::score::ScoreLedger;
use behavior::BehaviorBuffers;
use triggers::TriggerEvent;

/// Scratch space reused across ticks.
#[derive(Default)]
pub struct SystemBuffers {
    pub behavior: BehaviorBuffers,
    pub triggers: Vec<TriggerEvent>,
}

/// What happened during one tick, for stats logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub touches: usize,
    pub feeds: usize,
    pub messes_spawned: usize,
    pub messes_cleaned: usize,
    pub freezes_released: usize,
}

impl std::ops::AddAssign for TickReport {
    fn add_assign(&mut self, other: Self) {
        self.touches += other.touches;
        self.feeds += other.feeds;
        self.messes_spawned += other.messes_spawned;
        self.messes_cleaned += other.messes_cleaned;
        self.freezes_released += other.freezes_released;
    }
}

/// Run all simulation systems for one fixed tick.
#[allow(clippy::too_many_arguments)]
pub fn tick(
    world: &mut hecs::World,
    dt: f32,
    now: f64,
    spatial: &mut dyn SpatialQuery,
    ledger: &mut ScoreLedger,
    rng: &mut fastrand::Rng,
    rules: &MatchConfig,
    bufs: &mut SystemBuffers,
) -> TickReport {
    let mut report = TickReport::default();

    // 1. Index players, food, and props for this tick's queries
    spatial.refresh(world);

    // 2. Interaction volumes -> mediator
    bufs.triggers.clear();
    triggers::update(world, spatial, &mut bufs.triggers);
    for event in bufs.triggers.drain(..) {
        // Two animals can reach the same food in one tick; the loser sees
        // NotFood, which is expected.
        let result = match event {
            TriggerEvent::Touch { animal, player } => {
                interaction::player_touched(world, ledger, animal, player)
                    .map(|hit| report.touches += hit as usize)
            }
            TriggerEvent::Feed { animal, food } => {
                interaction::fed(world, animal, food).map(|hit| report.feeds += hit as usize)
            }
        };
        if let Err(e) = result {
            log::debug!("Dropped trigger {event:?}: {e}");
        }
    }

    // 3. Distraction opportunities (may preempt before transitions run)
    distraction::update(world, dt, now, spatial, rng);

    // 4. Behavior state machine transitions
    behavior::update(world, dt, now, spatial, rng, &mut bufs.behavior);

    // 5. Spawn queued messes and shove props
    report.messes_spawned = bufs.behavior.messes.len();
    for pending in bufs.behavior.messes.drain(..) {
        mess::spawn_mess(world, &pending);
    }
    props::apply_knocks(world, &bufs.behavior.knocks, rng);
    bufs.behavior.knocks.clear();

    // 6. Movement intents for this tick's states
    movement::update(world, dt);

    // 7. Prop physics
    props::update(world, dt);

    // 8. Mess proximity and cleanup timers
    report.messes_cleaned = mess::update(world, dt, ledger, rules.mess_interact_range);

    // 9. Freeze leases
    report.freezes_released = freeze::update(world, dt);

    report
}

/// Cancel every scoped operation in flight. Returns (freezes, cleanups)
/// released.
pub fn cancel_scoped(world: &mut hecs::World) -> (usize, usize) {
    (freeze::release_all(world), mess::cancel_all(world))
}
