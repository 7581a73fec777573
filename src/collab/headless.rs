//! Engine-free collaborators: a flat rectangular field, a kinematic mover,
//! and an effects sink that logs cues.

use glam::{Vec2, Vec3};

use crate::animal::animation::AnimationState;
use crate::collab::{AnimationEffects, Classifier, Gait, Locomotion, MoveIntent, SpatialQuery};
use crate::ecs::components::{Food, Knockable, Player, Position};
use crate::spatial::{EntitySnapshot, SpatialHash};

/// Spatial hash cell size (units).
const CELL_SIZE: f32 = 4.0;
const TABLE_SIZE: usize = 1024;
/// How quickly a mover reaches its intended velocity (1/s).
const ACCELERATION: f32 = 10.0;
/// Minimum velocity magnitude before snapping to zero.
const MIN_VELOCITY: f32 = 0.05;

/// Walkable axis-aligned rectangle at a fixed height.
pub struct FlatGround {
    min: Vec2,
    max: Vec2,
    height: f32,
    grid: SpatialHash,
    snapshots: Vec<EntitySnapshot>,
}

impl FlatGround {
    /// Ground spanning `min..max` on the (x, z) plane.
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            height,
            grid: SpatialHash::new(CELL_SIZE, TABLE_SIZE),
            snapshots: Vec::with_capacity(64),
        }
    }

    fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.y && z <= self.max.y
    }

    fn push(&mut self, entity: hecs::Entity, pos: Vec3, classifier: Classifier) {
        let idx = self.snapshots.len() as u32;
        self.snapshots.push(EntitySnapshot {
            entity,
            pos,
            classifier,
        });
        self.grid.insert(pos, idx);
    }
}

impl SpatialQuery for FlatGround {
    fn refresh(&mut self, world: &hecs::World) {
        self.grid.clear();
        self.snapshots.clear();
        let mut found = Vec::new();
        for (entity, (pos, _)) in world.query::<(&Position, &Player)>().iter() {
            found.push((entity, pos.0, Classifier::Player));
        }
        for (entity, (pos, _)) in world.query::<(&Position, &Food)>().iter() {
            found.push((entity, pos.0, Classifier::Food));
        }
        for (entity, (pos, _)) in world.query::<(&Position, &Knockable)>().iter() {
            found.push((entity, pos.0, Classifier::Knockable));
        }
        for (entity, pos, classifier) in found {
            self.push(entity, pos, classifier);
        }
    }

    fn sample_walkable_point(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let x = center.x.clamp(self.min.x, self.max.x);
        let z = center.z.clamp(self.min.y, self.max.y);
        let snapped = Vec3::new(x, self.height, z);
        let planar = Vec2::new(x - center.x, z - center.z).length();
        (planar <= radius).then_some(snapped)
    }

    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3> {
        let drop = origin.y - self.height;
        if !self.contains(origin.x, origin.z) || drop < 0.0 || drop > max_distance {
            return None;
        }
        Some(Vec3::new(origin.x, self.height, origin.z))
    }

    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        classifier: Classifier,
    ) -> Vec<hecs::Entity> {
        let radius_sq = radius * radius;
        let mut hits = Vec::new();
        self.grid.query_radius(center, radius, |idx| {
            let snap = &self.snapshots[idx as usize];
            if snap.classifier == classifier
                && snap.pos.distance_squared(center) <= radius_sq
                && !hits.contains(&snap.entity)
            {
                hits.push(snap.entity);
            }
        });
        hits
    }
}

/// Velocity-integrating mover with separate walk and run speeds.
pub struct KinematicMover {
    position: Vec3,
    velocity: Vec3,
    intent: MoveIntent,
    walk_speed: f32,
    run_speed: f32,
}

impl KinematicMover {
    pub fn new(position: Vec3, walk_speed: f32, run_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            intent: MoveIntent::still(position),
            walk_speed,
            run_speed,
        }
    }
}

impl Locomotion for KinematicMover {
    fn set_intent(&mut self, intent: MoveIntent) {
        self.intent = intent;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn advance(&mut self, dt: f32) {
        let speed = if self.intent.running {
            self.run_speed
        } else {
            self.walk_speed
        };
        let desired = Vec3::new(self.intent.axis.x, 0.0, self.intent.axis.y) * speed;
        let blend = (ACCELERATION * dt).min(1.0);
        self.velocity = self.velocity.lerp(desired, blend);
        if self.velocity.length_squared() < MIN_VELOCITY * MIN_VELOCITY {
            self.velocity = Vec3::ZERO;
        }
        self.position += self.velocity * dt;
    }
}

/// Logs cues and keeps smoothed animator parameters.
pub struct LogEffects {
    name: String,
    tick_dt: f32,
    walk_speed: f32,
    run_speed: f32,
    pub animation: AnimationState,
}

impl LogEffects {
    pub fn new(name: impl Into<String>, tick_dt: f32, walk_speed: f32, run_speed: f32) -> Self {
        Self {
            name: name.into(),
            tick_dt,
            walk_speed,
            run_speed,
            animation: AnimationState::default(),
        }
    }
}

impl AnimationEffects for LogEffects {
    fn set_motion_state(&mut self, speed: f32, gait: Gait) {
        self.animation.update(
            speed,
            gait == Gait::Run,
            self.walk_speed,
            self.run_speed,
            self.tick_dt,
        );
    }

    fn trigger_cue(&mut self, cue: &str) {
        log::debug!("{}: cue '{cue}'", self.name);
    }
}
