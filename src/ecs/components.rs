use glam::Vec3;

use crate::collab::{AnimationEffects, Gait, Locomotion};
use crate::timer::StateTimer;

/// Current world position.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec3);

/// Velocity in units/second. Only props integrate this directly; animals
/// are moved by their [`Mover`].
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vec3);

/// Spawn point. Wander targets are sampled around it.
#[derive(Debug, Clone, Copy)]
pub struct Home(pub Vec3);

/// Forward direction of a player, used to place herding follow points.
#[derive(Debug, Clone, Copy)]
pub struct Facing(pub Vec3);

/// Display name for logs.
#[derive(Debug, Clone)]
pub struct AnimalName(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AnimalState {
    Idle,
    Wandering,
    MakingMess,
    Distracted,
    Herded,
}

/// Who an animal is following while herded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HerdFollow {
    /// Follow point is re-derived from this player's pose every tick while
    /// the player exists.
    pub player: Option<hecs::Entity>,
    pub follow_distance: f32,
}

/// Behavior state machine data for one animal.
#[derive(Debug, Clone)]
pub struct Brain {
    pub state: AnimalState,
    pub timer: StateTimer,
    /// Wander target, mess spawn point, or herding follow point.
    pub target: Option<Vec3>,
    /// Player position tracked while distracted.
    pub threat: Option<Vec3>,
    /// Only meaningful while wandering.
    pub is_running: bool,
    /// Herded because of feeding (as opposed to a herd command).
    pub is_being_herded: bool,
    /// Sim time of the last exit from `Distracted`.
    pub last_distraction_at: f64,
    /// Seconds until the next distraction opportunity check.
    pub distraction_check: f32,
    pub herd: Option<HerdFollow>,
}

impl Brain {
    pub fn new(timer: StateTimer, now: f64) -> Self {
        Self {
            state: AnimalState::Idle,
            timer,
            target: None,
            threat: None,
            is_running: false,
            is_being_herded: false,
            last_distraction_at: now,
            distraction_check: 1.0,
            herd: None,
        }
    }
}

/// Mandatory locomotion handle.
pub struct Mover(pub Box<dyn Locomotion>);

/// Optional animation/effects handle, resolved once at spawn.
pub struct Effects(pub Option<Box<dyn AnimationEffects>>);

impl Effects {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn cue(&mut self, cue: &str) {
        if let Some(fx) = &mut self.0 {
            fx.trigger_cue(cue);
        }
    }

    pub fn motion(&mut self, speed: f32, gait: Gait) {
        if let Some(fx) = &mut self.0 {
            fx.set_motion_state(speed, gait);
        }
    }
}

/// Trigger volume around an animal. `inside` remembers who was already in
/// range so only enter edges fire.
#[derive(Debug, Clone, Default)]
pub struct InteractVolume {
    pub radius: f32,
    pub inside: Vec<hecs::Entity>,
}

/// Marks a player entity.
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Capabilities an animal can take away from a player. Assigned when the
/// player is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freezable {
    pub movement_enabled: bool,
    pub input_enabled: bool,
    pub kinematic: bool,
}

impl Default for Freezable {
    fn default() -> Self {
        Self {
            movement_enabled: true,
            input_enabled: true,
            kinematic: false,
        }
    }
}

impl Freezable {
    pub const FROZEN: Self = Self {
        movement_enabled: false,
        input_enabled: false,
        kinematic: true,
    };
}

/// Present on a player while frozen. Holds the capabilities to restore.
#[derive(Debug, Clone, Copy)]
pub struct FreezeLease {
    pub saved: Freezable,
    pub timer: StateTimer,
    pub frozen_by: hecs::Entity,
}

/// Something an animal can be fed with.
#[derive(Debug, Clone, Copy)]
pub struct Food {
    pub thrown_by: Option<hecs::Entity>,
}

/// Prop that gets shoved around when a mess is made nearby.
#[derive(Debug, Clone, Copy)]
pub struct Knockable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    Idle,
    PlayerInRange,
    BeingCleaned,
    Cleaned,
}

/// The player a mess is currently paired with. Not an ownership relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerContact {
    pub player: hecs::Entity,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct MessObject {
    pub kind: String,
    pub points: i32,
    pub cleanup_duration: f32,
    pub state: CleanupState,
    pub contact: Option<PlayerContact>,
    pub cleanup: StateTimer,
    pub spawned_by: Option<hecs::Entity>,
}
