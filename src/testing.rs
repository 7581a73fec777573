//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};

use crate::collab::headless::FlatGround;
use crate::collab::{AnimationEffects, Classifier, Gait, Locomotion, MoveIntent, SpatialQuery};

/// Flat field large enough that no sample ever falls off it.
pub fn open_ground() -> FlatGround {
    FlatGround::new(Vec2::splat(-1000.0), Vec2::splat(1000.0), 0.0)
}

/// Nothing is walkable and nothing overlaps.
pub struct NoGround;

impl SpatialQuery for NoGround {
    fn sample_walkable_point(&self, _center: Vec3, _radius: f32) -> Option<Vec3> {
        None
    }

    fn raycast_down(&self, _origin: Vec3, _max_distance: f32) -> Option<Vec3> {
        None
    }

    fn overlap_sphere(&self, _center: Vec3, _radius: f32, _classifier: Classifier) -> Vec<hecs::Entity> {
        Vec::new()
    }
}

/// Moves instantly at `speed` along the intent axis and records every intent.
pub struct RecordingMover {
    pub pos: Vec3,
    pub speed: f32,
    pub vel: Vec3,
    pub intents: Arc<Mutex<Vec<MoveIntent>>>,
}

impl RecordingMover {
    pub fn new(pos: Vec3) -> (Self, Arc<Mutex<Vec<MoveIntent>>>) {
        let intents = Arc::new(Mutex::new(Vec::new()));
        let mover = Self {
            pos,
            speed: 2.0,
            vel: Vec3::ZERO,
            intents: intents.clone(),
        };
        (mover, intents)
    }
}

impl Locomotion for RecordingMover {
    fn set_intent(&mut self, intent: MoveIntent) {
        self.vel = Vec3::new(intent.axis.x, 0.0, intent.axis.y) * self.speed;
        self.intents.lock().unwrap().push(intent);
    }

    fn velocity(&self) -> Vec3 {
        self.vel
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// Records cues and motion states.
#[derive(Clone, Default)]
pub struct RecordingEffects {
    pub cues: Arc<Mutex<Vec<String>>>,
    pub motion: Arc<Mutex<Vec<(f32, Gait)>>>,
}

impl AnimationEffects for RecordingEffects {
    fn set_motion_state(&mut self, speed: f32, gait: Gait) {
        self.motion.lock().unwrap().push((speed, gait));
    }

    fn trigger_cue(&mut self, cue: &str) {
        self.cues.lock().unwrap().push(cue.to_string());
    }
}
