//! # veriseal Core
//!
//! Pure primitives for veriseal: audit records, canonical encoding, and the
//! hash/signature primitives behind tamper detection.
//!
//! This crate contains no I/O, no networking, no async. It is pure
//! computation over already-fetched audit data.
//!
//! ## Key Types
//!
//! - [`AuditRecord`] - one sealed entry of the audit chain
//! - [`CanonicalValue`] - closed variant set for deterministic encoding
//! - [`ContentHash`] - SHA-256 digest of a record's canonical content
//! - [`Ed25519PublicKey`] - the verification credential
//!
//! ## Canonicalization
//!
//! Records digest a deterministic JSON rendering of their content fields,
//! invariant to map-key insertion order at any depth. See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod record;

pub use canonical::{canonical_bytes, canonical_string, CanonicalValue};
pub use crypto::{
    verify_record_signature, ContentHash, Ed25519PublicKey, Ed25519Signature, Keypair,
};
pub use error::CoreError;
pub use record::{
    ActionResult, Actor, AuditRecord, Change, RecordBuilder, Target, GENESIS_SEQUENCE,
};
