//! Error types for the verification service.

use thiserror::Error;

/// Failure to obtain or decode the verification credential.
///
/// Distinct from verification findings: a missing key says nothing about
/// whether records were tampered with, so it surfaces as an `Err` instead of
/// being folded into a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential fetch failed: {0}")]
    Fetch(String),

    #[error("invalid public key credential: {0}")]
    InvalidKey(String),

    #[error("credential fetch aborted before completion")]
    Aborted,
}

/// Result type for verification service operations.
pub type Result<T> = std::result::Result<T, CredentialError>;
