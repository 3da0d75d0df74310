//! Error types for the relay engine

use thiserror::Error;

/// Errors raised while resolving, rewriting or forwarding a message
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Route for domain {0} not found")]
    RouteNotFound(String),

    #[error("Relationship for {0} not found")]
    RelationshipNotFound(String),

    #[error("Missing {0} header")]
    MissingHeader(String),

    #[error("No process for call {0}")]
    UnknownCall(String),

    #[error("Process capacity of {0} reached")]
    CapacityExceeded(usize),

    #[error("Loop detected for call {0}")]
    LoopDetected(String),

    #[error("Work queue full")]
    QueueFull,

    #[error("Work queue closed")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] sipbridge_sip_transport::Error),

    #[error("SIP error: {0}")]
    Sip(#[from] sipbridge_sip_core::Error),
}

impl RelayError {
    /// Whether the error means a message could not be tied to a call
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            RelayError::RouteNotFound(_)
                | RelayError::RelationshipNotFound(_)
                | RelayError::MissingHeader(_)
                | RelayError::UnknownCall(_)
                | RelayError::CapacityExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
