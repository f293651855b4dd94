//! Record and chain verification.
//!
//! Verification is synchronous, side-effect-free computation over
//! already-fetched records; the only I/O is the one-time credential fetch
//! behind [`CredentialCache`]. Nothing here retries: every failure is a
//! genuine finding about static data, not a transient error.

use veriseal_core::{
    verify_record_signature, AuditRecord, Ed25519PublicKey, GENESIS_SEQUENCE,
};

use crate::credential::{CredentialCache, CredentialSource};
use crate::error::Result;
use crate::report::{ChainFailure, ChainVerification, RecordVerification, VerificationFailure};

/// Whether a record set claims to be the whole chain or an interior slice.
///
/// A complete chain must start at [`GENESIS_SEQUENCE`]; a range may start
/// anywhere, and the genesis rule applies only if the range happens to
/// include the genesis record. Callers state which one they hold so a
/// truncated set cannot pass for a full chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainScope {
    Complete,
    Range,
}

/// The verification service: the pure checks plus a cached credential.
pub struct Verifier<S> {
    credentials: CredentialCache<S>,
}

impl<S: CredentialSource> Verifier<S> {
    /// Create a verifier over the given credential source. The public key
    /// is fetched lazily on the first verification call.
    pub fn new(source: S) -> Self {
        Self {
            credentials: CredentialCache::new(source),
        }
    }

    /// The underlying credential cache.
    pub fn credentials(&self) -> &CredentialCache<S> {
        &self.credentials
    }

    /// Verify a single record's content digest and signature.
    pub async fn verify_record(&self, record: &AuditRecord) -> Result<RecordVerification> {
        let key = self.credentials.get().await?;
        Ok(verify_record_with_key(record, &key))
    }

    /// Verify a record set as the complete chain: it must begin at the
    /// genesis sequence.
    pub async fn verify_chain(&self, records: &[AuditRecord]) -> Result<ChainVerification> {
        let key = self.credentials.get().await?;
        Ok(verify_chain_with_key(records, &key, ChainScope::Complete))
    }

    /// Verify a record set as an interior slice of the chain.
    pub async fn verify_range(&self, records: &[AuditRecord]) -> Result<ChainVerification> {
        let key = self.credentials.get().await?;
        Ok(verify_chain_with_key(records, &key, ChainScope::Range))
    }
}

/// Verify one record against a known key.
///
/// Checks run in strict order and short-circuit: a record whose digest does
/// not match its content has no meaningful signature to check.
pub fn verify_record_with_key(
    record: &AuditRecord,
    key: &Ed25519PublicKey,
) -> RecordVerification {
    match check_record(record, key) {
        None => RecordVerification::ok(),
        Some(failure) => RecordVerification::failed(failure),
    }
}

/// Verify an unordered record set as a chain.
///
/// Records are sorted by sequence number first, so input order never
/// affects the result. A failed record is reported and skipped, not fatal:
/// one broken link must not hide findings about the rest of the set.
pub fn verify_chain_with_key(
    records: &[AuditRecord],
    key: &Ed25519PublicKey,
    scope: ChainScope,
) -> ChainVerification {
    let mut sorted: Vec<&AuditRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.sequence_number);

    let mut failures: Vec<ChainFailure> = Vec::new();
    let mut valid_records = 0usize;

    for (i, record) in sorted.iter().enumerate() {
        let prev = if i > 0 { Some(sorted[i - 1]) } else { None };
        match check_chain_record(record, prev, scope, key) {
            Some(failure) => {
                tracing::warn!(
                    sequence = record.sequence_number,
                    %failure,
                    "record failed chain verification"
                );
                failures.push(ChainFailure {
                    sequence_number: record.sequence_number,
                    failure,
                });
            }
            None => valid_records += 1,
        }
    }

    let total_records = sorted.len();
    ChainVerification {
        valid: failures.is_empty(),
        total_records,
        valid_records,
        invalid_records: total_records - valid_records,
        broken_at: failures.first().map(|f| f.sequence_number),
        failures,
    }
}

/// Digest and signature checks shared by single-record and chain paths.
fn check_record(record: &AuditRecord, key: &Ed25519PublicKey) -> Option<VerificationFailure> {
    // 1. The content must reproduce the stored digest.
    let computed = record.content_hash().to_hex();
    if computed != record.hash {
        return Some(VerificationFailure::HashMismatch {
            computed,
            stored: record.hash.clone(),
        });
    }

    // 2. The signature covers the textual digest.
    if !verify_record_signature(key, &record.hash, &record.signature) {
        return Some(VerificationFailure::SignatureInvalid);
    }

    None
}

/// Full check for one record in chain position.
fn check_chain_record(
    record: &AuditRecord,
    prev: Option<&AuditRecord>,
    scope: ChainScope,
    key: &Ed25519PublicKey,
) -> Option<VerificationFailure> {
    // 1-2. Content digest and signature, as for a single record.
    if let Some(failure) = check_record(record, key) {
        return Some(failure);
    }

    match prev {
        Some(prev) => {
            // 3a. Sequence continuity. A gap makes the linkage check moot,
            // so it is skipped for this record.
            let expected = prev.sequence_number.saturating_add(1);
            if record.sequence_number != expected {
                return Some(VerificationFailure::SequenceGap {
                    expected,
                    got: record.sequence_number,
                });
            }

            // 3b. The link must point at the predecessor's declared hash.
            // Declared, not recomputed: a corrupted predecessor must not
            // cascade into failures for its still-valid successors.
            if record.previous_hash.as_deref() != Some(prev.hash.as_str()) {
                return Some(VerificationFailure::ChainBroken {
                    expected: prev.hash.clone(),
                    got: record.previous_hash.clone(),
                });
            }
        }
        None => {
            // 4. Genesis rules for the first record in sorted order.
            if scope == ChainScope::Complete && !record.is_genesis() {
                return Some(VerificationFailure::StartsAfterGenesis {
                    first: record.sequence_number,
                    expected: GENESIS_SEQUENCE,
                });
            }
            if record.is_genesis() && record.previous_hash.is_some() {
                return Some(VerificationFailure::GenesisPreviousHash);
            }
        }
    }

    None
}
