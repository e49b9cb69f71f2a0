use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcasterError {
    #[error("invalid BPM {0}: must be finite and greater than zero")]
    InvalidBpm(f64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keep-alive already running")]
    AlreadyRunning,

    #[error("Keep-alive not started")]
    NotStarted,
}

pub type Result<T> = std::result::Result<T, BroadcasterError>;
