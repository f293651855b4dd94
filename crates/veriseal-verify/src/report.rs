//! Verification reports: per-record and chain-level verdicts.
//!
//! Failures are findings, not control flow. A tampered record is a result
//! the engine reports; nothing here is thrown, retried, or fixed up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a record failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationFailure {
    /// The recomputed content digest differs from the stored one.
    #[error("hash mismatch: computed {computed}, stored {stored}")]
    HashMismatch { computed: String, stored: String },

    /// The digest matched but the signature over it did not verify.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The record does not follow its predecessor by exactly one.
    #[error("sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    /// The record's previous-hash does not match its predecessor's hash.
    #[error("chain broken: previous hash does not match predecessor")]
    ChainBroken {
        expected: String,
        got: Option<String>,
    },

    /// The genesis record carries a previous-hash where none is expected.
    #[error("genesis record must not have a previous hash")]
    GenesisPreviousHash,

    /// A complete chain must begin at the genesis sequence.
    #[error("chain starts at sequence {first}, expected {expected}")]
    StartsAfterGenesis { first: u64, expected: u64 },
}

/// Verdict for a single record. Constructed fresh per call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordVerification {
    pub valid: bool,
    pub hash_valid: bool,
    pub signature_valid: bool,
    pub failure: Option<VerificationFailure>,
}

impl RecordVerification {
    pub(crate) fn ok() -> Self {
        Self {
            valid: true,
            hash_valid: true,
            signature_valid: true,
            failure: None,
        }
    }

    pub(crate) fn failed(failure: VerificationFailure) -> Self {
        let hash_valid = !matches!(failure, VerificationFailure::HashMismatch { .. });
        Self {
            valid: false,
            hash_valid,
            signature_valid: false,
            failure: Some(failure),
        }
    }
}

/// One failed record within a chain verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainFailure {
    pub sequence_number: u64,
    pub failure: VerificationFailure,
}

/// Aggregate verdict over a record set, built from one pass in sequence
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainVerification {
    /// True only if no record failed any check.
    pub valid: bool,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    /// Sequence number of the first failure in sorted order.
    pub broken_at: Option<u64>,
    /// Failures in ascending sequence order.
    pub failures: Vec<ChainFailure>,
}
