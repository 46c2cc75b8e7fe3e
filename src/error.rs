use std::path::PathBuf;

/// Error type returned by external collaborators (agents and environments).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint interval must be > 0")]
    InvalidInterval,

    #[error("failed to read results from {path}: {source}")]
    ResultsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse results from {path}: {source}")]
    ResultsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while running an experiment.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("agent error: {0}")]
    Agent(#[source] BoxError),

    #[error("environment error: {0}")]
    Environment(#[source] BoxError),

    #[error("failed to serialize run statistics: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
