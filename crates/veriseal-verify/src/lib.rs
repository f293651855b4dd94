//! # veriseal Verify
//!
//! Client-side verification of hash-chained audit logs: do the records hash
//! correctly, carry valid signatures, and link into an unbroken chain?
//! Decided locally, without trusting the server that produced them.
//!
//! ## Overview
//!
//! [`Verifier`] owns a [`CredentialCache`] over a [`CredentialSource`]
//! collaborator. The public key is fetched at most once; concurrent callers
//! share the in-flight fetch. Verification itself is pure computation:
//! per-record digest and signature checks, then structural chain checks
//! (sequence continuity, hash linkage, genesis rules).
//!
//! ```
//! use veriseal_verify::{credential::memory::StaticKeySource, Verifier};
//! # async fn demo(records: Vec<veriseal_core::AuditRecord>, key_hex: String) {
//! let verifier = Verifier::new(StaticKeySource::new(key_hex));
//! let report = verifier.verify_chain(&records).await.unwrap();
//! if !report.valid {
//!     for failure in &report.failures {
//!         eprintln!("record {}: {}", failure.sequence_number, failure.failure);
//!     }
//! }
//! # }
//! ```
//!
//! Failed records never abort a batch: every finding is collected into the
//! [`ChainVerification`] report. Only a credential-fetch failure is an
//! error, and it resets the cache so a later call can retry.

pub mod credential;
pub mod error;
pub mod report;
pub mod verifier;

pub use credential::{CredentialCache, CredentialSource};
pub use error::CredentialError;
pub use report::{ChainFailure, ChainVerification, RecordVerification, VerificationFailure};
pub use verifier::{verify_chain_with_key, verify_record_with_key, ChainScope, Verifier};
