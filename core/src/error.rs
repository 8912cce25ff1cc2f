use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown region '{name}'")]
    RegionNotFound { name: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
