pub mod animation;

use glam::{Vec2, Vec3};

use crate::collab::headless::{KinematicMover, LogEffects};
use crate::collab::{AnimationEffects, Locomotion};
use crate::config::AnimalConfig;
use crate::ecs::components::*;
use crate::error::SpawnError;
use crate::timer::{range_f32, StateTimer};

/// Assembles an animal entity. Locomotion is mandatory; effects are not.
pub struct AnimalBuilder {
    name: String,
    position: Vec3,
    config: AnimalConfig,
    locomotion: Option<Box<dyn Locomotion>>,
    effects: Option<Box<dyn AnimationEffects>>,
}

impl AnimalBuilder {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            config: AnimalConfig::default(),
            locomotion: None,
            effects: None,
        }
    }

    pub fn config(mut self, config: AnimalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn locomotion(mut self, locomotion: impl Locomotion + 'static) -> Self {
        self.locomotion = Some(Box::new(locomotion));
        self
    }

    pub fn effects(mut self, effects: impl AnimationEffects + 'static) -> Self {
        self.effects = Some(Box::new(effects));
        self
    }

    /// Spawn into `world`. The animal starts idle with a freshly drawn
    /// idle time; `now` seeds the distraction cooldown.
    pub fn spawn(
        self,
        world: &mut hecs::World,
        rng: &mut fastrand::Rng,
        now: f64,
    ) -> Result<hecs::Entity, SpawnError> {
        let locomotion = self
            .locomotion
            .ok_or_else(|| SpawnError::MissingLocomotion(self.name.clone()))?;
        let config = self.config.validated();

        let idle = range_f32(rng, config.idle_time_min, config.idle_time_max);
        let brain = Brain::new(StateTimer::start(idle), now);
        let volume = InteractVolume {
            radius: config.interact_radius,
            inside: Vec::new(),
        };

        let entity = world.spawn((
            Position(self.position),
            Home(self.position),
            brain,
            config,
            Mover(locomotion),
            Effects(self.effects),
            volume,
            AnimalName(self.name.clone()),
        ));
        log::debug!("Spawned {} at {:?}", self.name, self.position);
        Ok(entity)
    }
}

/// Spawn a batch of animals with kinematic movers scattered over `min..max`.
pub fn spawn_zoo(
    world: &mut hecs::World,
    count: usize,
    min: Vec2,
    max: Vec2,
    config: &AnimalConfig,
    tick_dt: f32,
    rng: &mut fastrand::Rng,
    now: f64,
) -> Result<Vec<hecs::Entity>, SpawnError> {
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let pos = Vec3::new(
            range_f32(rng, min.x, max.x),
            0.0,
            range_f32(rng, min.y, max.y),
        );
        let name = generate_animal_name(rng);
        let entity = AnimalBuilder::new(name.clone(), pos)
            .config(config.clone())
            .locomotion(KinematicMover::new(pos, config.walk_speed, config.run_speed))
            .effects(LogEffects::new(name, tick_dt, config.walk_speed, config.run_speed))
            .spawn(world, rng, now)?;
        spawned.push(entity);
    }
    Ok(spawned)
}

/// Generate a procedural animal name from name parts.
fn generate_animal_name(rng: &mut fastrand::Rng) -> String {
    const NAMES: &[&str] = &[
        "Biscuit", "Pepper", "Noodle", "Mochi", "Turnip", "Waffles", "Clover",
        "Bramble", "Pickles", "Nugget", "Daisy", "Rascal", "Button", "Maple",
    ];
    const SPECIES: &[&str] = &[
        "the Goat", "the Pig", "the Sheep", "the Duck", "the Llama", "the Hen",
        "the Donkey", "the Alpaca",
    ];
    format!(
        "{} {}",
        NAMES[rng.usize(0..NAMES.len())],
        SPECIES[rng.usize(0..SPECIES.len())],
    )
}
