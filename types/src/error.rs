//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for admission-token primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmitError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("malformed hash: {0}")]
    MalformedHash(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
