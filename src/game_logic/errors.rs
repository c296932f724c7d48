use crate::components::ActorId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    // Config-related errors
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    // Scene-related errors
    #[error("Scene file not found at path: {path}")]
    SceneFileNotFound { path: PathBuf },

    #[error("Scene validation failed: {reason}")]
    SceneValidationFailed { reason: String },

    #[error("Invalid scene data: {reason}")]
    InvalidSceneData { reason: String },

    // Navigation-related errors
    #[error("Unknown actor: {id}")]
    UnknownActor { id: ActorId },

    #[error("Actor {id} is already registered")]
    DuplicateActor { id: ActorId },
}

/// Result type alias for all fallible operations
pub type NavResult<T> = Result<T, NavError>;
