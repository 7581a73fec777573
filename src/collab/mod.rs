//! Interfaces to the host engine. The behavior core only talks to the world
//! through these; `headless` provides implementations for the demo and tests.

pub mod headless;

use glam::{Vec2, Vec3};

/// Entity categories an overlap query can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classifier {
    Player,
    Food,
    Knockable,
}

/// Ray casts, walkable-surface sampling, and overlap queries.
pub trait SpatialQuery {
    /// Rebuild any cached index from the world. Called once per tick before
    /// any system runs.
    fn refresh(&mut self, _world: &hecs::World) {}

    /// Nearest walkable point within `radius` of `center`.
    fn sample_walkable_point(&self, center: Vec3, radius: f32) -> Option<Vec3>;

    /// First surface hit straight down from `origin`.
    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Entities of the given class within `radius` of `center`.
    fn overlap_sphere(&self, center: Vec3, radius: f32, classifier: Classifier)
        -> Vec<hecs::Entity>;
}

/// Movement request for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveIntent {
    /// Planar direction on the ground plane (x, z). Length ≤ 1.
    pub axis: Vec2,
    pub look_target: Vec3,
    pub running: bool,
}

impl MoveIntent {
    pub fn still(look_target: Vec3) -> Self {
        Self {
            axis: Vec2::ZERO,
            look_target,
            running: false,
        }
    }
}

/// Moves an animal. Mandatory for every animal.
pub trait Locomotion: Send + Sync {
    fn set_intent(&mut self, intent: MoveIntent);
    fn velocity(&self) -> Vec3;
    fn position(&self) -> Vec3;

    /// Integrate one tick. Host-driven movers can ignore this.
    fn advance(&mut self, _dt: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Walk,
    Run,
}

/// Receives semantic animation and effect requests. Optional per animal.
pub trait AnimationEffects: Send + Sync {
    fn set_motion_state(&mut self, speed: f32, gait: Gait);
    fn trigger_cue(&mut self, cue: &str);
}

/// Cue names emitted by the behavior core.
pub mod cues {
    pub const DISTRACTION: &str = "distraction";
    pub const FEED: &str = "feed";
    pub const TOUCH: &str = "touch";
    /// Pool a distracted animal picks one sound from.
    pub const SOUNDS: &[&str] = &["call", "snort", "squeal", "rustle"];
}
