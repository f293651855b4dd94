//! Error types for veriseal core primitives.

use thiserror::Error;

/// Errors from decoding key or signature material.
///
/// These cover malformed inputs only. A signature that decodes but does not
/// verify is a verification finding, not an error.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed key encoding: {0}")]
    MalformedKey(String),

    #[error("malformed signature encoding: {0}")]
    MalformedSignature(String),

    #[error("malformed hash encoding: {0}")]
    MalformedHash(String),
}
