//! Autonomous farm-animal behavior for a cleaners-vs-animals party game.
//!
//! Animals wander, make messes, get distracted by nearby players, and can
//! be herded by feeding or by command. Players lose points when an animal
//! freezes them and earn points by cleaning messes. The engine never talks
//! to a game engine directly; it goes through the traits in [`collab`].

pub mod animal;
pub mod collab;
pub mod config;
pub mod ecs;
pub mod error;
pub mod match_clock;
pub mod score;
pub mod sim;
pub mod spatial;
pub mod timer;

#[cfg(test)]
mod testing;

pub use animal::AnimalBuilder;
pub use config::{AnimalConfig, GameConfig, HerdingConfig, MatchConfig, MessKind};
pub use error::{ConfigError, EventError, SpawnError};
pub use match_clock::{MatchClock, MatchEvent, MatchPhase, Outcome};
pub use score::ScoreLedger;
pub use sim::Simulation;
