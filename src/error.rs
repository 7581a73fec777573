use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing entities.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Animals cannot exist without something to move them.
    #[error("animal '{0}' has no locomotion collaborator")]
    MissingLocomotion(String),
}

/// Errors raised when an interaction event names the wrong kind of entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("entity {0:?} is not an animal")]
    NotAnAnimal(hecs::Entity),
    #[error("entity {0:?} is not a player")]
    NotAPlayer(hecs::Entity),
    #[error("entity {0:?} is not food")]
    NotFood(hecs::Entity),
    #[error("entity {0:?} is not a mess")]
    NotAMess(hecs::Entity),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
