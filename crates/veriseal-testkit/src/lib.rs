//! # veriseal Testkit
//!
//! Testing utilities for veriseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: deterministic keypairs and fully linked, sealed record
//!   chains for integration tests
//! - **Generators**: proptest strategies for property-based testing
//!
//! ## Fixtures
//!
//! ```rust
//! use veriseal_testkit::TestFixture;
//!
//! let fixture = TestFixture::with_seed([0x42; 32]);
//! let records = fixture.chain(3);
//! assert_eq!(records[1].previous_hash.as_deref(), Some(records[0].hash.as_str()));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veriseal_testkit::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(params: RecordParams) {
//!         let r1 = record_from_params(&params);
//!         let r2 = record_from_params(&params);
//!         prop_assert_eq!(r1.hash, r2.hash);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
pub use generators::{record_from_params, RecordParams};
