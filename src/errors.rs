use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Error type shared by the window, editing and configuration layers.
///
/// The aggregator itself never returns one of these: data-shape problems in a
/// hierarchy snapshot are excluded silently instead.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Capacity already active from {0}")]
    DuplicateActiveFrom(String),
    #[error("Capacity not found: {0}")]
    CapacityNotFound(Uuid),
    #[error("Node {0} must keep at least one capacity")]
    LastCapacity(Uuid),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, EnvelopeError>;
