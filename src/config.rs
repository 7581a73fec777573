//! Tunable constants, loaded once at spawn and never mutated at runtime.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One variant of mess an animal can leave behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessKind {
    pub name: String,
    /// Points awarded to the cleaners on successful cleanup.
    pub points: i32,
    /// Seconds of uninterrupted cleaning needed.
    pub cleanup_duration: f32,
}

impl Default for MessKind {
    fn default() -> Self {
        Self {
            name: "spilled_feed".to_string(),
            points: 10,
            cleanup_duration: 2.0,
        }
    }
}

/// Per-animal behavior tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalConfig {
    // Wandering
    pub wander_radius: f32,
    pub idle_time_min: f32,
    pub idle_time_max: f32,
    pub move_time_min: f32,
    pub move_time_max: f32,
    pub run_chance: f32,
    pub walk_speed: f32,
    pub run_speed: f32,

    // Mess making
    pub can_cause_messes: bool,
    pub mess_chance: f32,
    /// Knockable props inside this radius get shoved when a mess is made.
    pub mess_radius: f32,
    pub mess_kinds: Vec<MessKind>,
    pub min_mess_count: u32,
    pub max_mess_count: u32,
    pub mess_spread_radius: f32,

    // Distraction
    pub can_cause_distraction: bool,
    pub distraction_radius: f32,
    pub distraction_cooldown: f32,

    // Player interaction
    pub freeze_duration: f32,
    pub freeze_penalty: i32,
    pub herding_duration: f32,
    pub follow_distance: f32,
    /// Radius of the trigger volume used for touch and feed events.
    pub interact_radius: f32,
}

impl Default for AnimalConfig {
    fn default() -> Self {
        Self {
            wander_radius: 10.0,
            idle_time_min: 2.0,
            idle_time_max: 5.0,
            move_time_min: 3.0,
            move_time_max: 8.0,
            run_chance: 0.2,
            walk_speed: 2.0,
            run_speed: 5.0,
            can_cause_messes: true,
            mess_chance: 0.1,
            mess_radius: 2.0,
            mess_kinds: vec![
                MessKind::default(),
                MessKind {
                    name: "muddy_prints".to_string(),
                    points: 15,
                    cleanup_duration: 3.0,
                },
                MessKind {
                    name: "droppings".to_string(),
                    points: 20,
                    cleanup_duration: 2.5,
                },
            ],
            min_mess_count: 1,
            max_mess_count: 3,
            mess_spread_radius: 1.5,
            can_cause_distraction: true,
            distraction_radius: 5.0,
            distraction_cooldown: 10.0,
            freeze_duration: 5.0,
            freeze_penalty: -50,
            herding_duration: 5.0,
            follow_distance: 3.0,
            interact_radius: 1.5,
        }
    }
}

impl AnimalConfig {
    /// Repair an inconsistent config instead of rejecting the whole animal.
    ///
    /// Inverted ranges are swapped, probabilities clamped to `[0, 1]`, and
    /// mess-making is switched off when there is nothing to spawn.
    pub fn validated(mut self) -> Self {
        swap_if_inverted("idle_time", &mut self.idle_time_min, &mut self.idle_time_max);
        swap_if_inverted("move_time", &mut self.move_time_min, &mut self.move_time_max);
        if self.max_mess_count < self.min_mess_count {
            log::warn!(
                "mess count range inverted ({} > {}), swapping",
                self.min_mess_count,
                self.max_mess_count
            );
            std::mem::swap(&mut self.min_mess_count, &mut self.max_mess_count);
        }
        if self.min_mess_count == 0 {
            log::warn!("min_mess_count must be at least 1, raising");
            self.min_mess_count = 1;
            self.max_mess_count = self.max_mess_count.max(1);
        }

        self.idle_time_min = self.idle_time_min.max(0.0);
        self.idle_time_max = self.idle_time_max.max(0.0);
        self.move_time_min = self.move_time_min.max(0.0);
        self.move_time_max = self.move_time_max.max(0.0);
        clamp_radius("wander_radius", &mut self.wander_radius);
        clamp_radius("mess_radius", &mut self.mess_radius);
        clamp_radius("mess_spread_radius", &mut self.mess_spread_radius);
        clamp_radius("distraction_radius", &mut self.distraction_radius);
        clamp_radius("interact_radius", &mut self.interact_radius);
        clamp_radius("follow_distance", &mut self.follow_distance);
        self.run_chance = self.run_chance.clamp(0.0, 1.0);
        self.mess_chance = self.mess_chance.clamp(0.0, 1.0);

        if self.can_cause_messes && self.mess_kinds.is_empty() {
            log::warn!("mess-making enabled with an empty mess pool, disabling");
            self.can_cause_messes = false;
        }
        self
    }
}

/// Largest radius or distance an animal may use, in world units.
pub const MAX_RADIUS: f32 = 1000.0;

fn clamp_radius(label: &str, value: &mut f32) {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_RADIUS)
    };
    if clamped != *value {
        log::warn!("{label} {value} out of range, using {clamped}");
        *value = clamped;
    }
}

fn swap_if_inverted(label: &str, min: &mut f32, max: &mut f32) {
    if *max < *min {
        log::warn!("{label} range inverted ({min} > {max}), swapping");
        std::mem::swap(min, max);
    }
}

/// Broadcast "herd now" command tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdingConfig {
    pub duration: f32,
    pub follow_distance: f32,
}

impl Default for HerdingConfig {
    fn default() -> Self {
        Self {
            duration: 3.0,
            follow_distance: 3.0,
        }
    }
}

/// Match-level rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Pre-match countdown in seconds.
    pub countdown: f32,
    /// Match length in seconds.
    pub duration: f32,
    /// Cleaners win as soon as the ledger reaches this total.
    pub win_points: i32,
    /// A player farther than this from a mess has left it.
    pub mess_interact_range: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            countdown: 3.0,
            duration: 300.0,
            win_points: 500,
            mess_interact_range: 2.0,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub animal: AnimalConfig,
    pub herding: HerdingConfig,
    pub match_rules: MatchConfig,
}

impl GameConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.animal = config.animal.validated();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
