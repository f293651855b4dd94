//! Test fixtures: deterministic keypairs and sealed record chains.
//!
//! Common setup code for integration tests.

use serde_json::json;

use veriseal_core::{
    ActionResult, Actor, AuditRecord, Change, Keypair, RecordBuilder, Target, GENESIS_SEQUENCE,
};

/// A fixture holding the signing identity for fabricated chains.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The hex encoding of the fixture's public key, as a credential source
    /// would serve it.
    pub fn public_key_hex(&self) -> String {
        self.keypair.public_key().to_hex()
    }

    /// Seal one record with realistic content.
    pub fn record(&self, seq: u64, previous_hash: Option<&str>) -> AuditRecord {
        let mut builder = RecordBuilder::new("proj_fixture", seq)
            .timestamp(format!("2024-05-01T10:{:02}:00Z", seq % 60))
            .action("user.login")
            .result(ActionResult::Success)
            .actor(Actor {
                id: format!("user_{seq}"),
                kind: "user".into(),
                display_name: Some("Ada Lovelace".into()),
            })
            .target(Target {
                id: "account_1".into(),
                kind: "account".into(),
                display_name: None,
            })
            .change(Change {
                path: "last_login".into(),
                old_value: json!(null),
                new_value: json!("2024-05-01T10:00:00Z"),
            })
            .context_entry("request_id", json!(format!("req_{seq}")))
            .metadata_entry("environment", json!("test"));
        if let Some(prev) = previous_hash {
            builder = builder.previous_hash(prev);
        }
        builder.seal(&self.keypair)
    }

    /// Seal a fully linked chain of `len` records starting at genesis.
    pub fn chain(&self, len: usize) -> Vec<AuditRecord> {
        let mut records = Vec::with_capacity(len);
        let mut previous_hash: Option<String> = None;
        for seq in GENESIS_SEQUENCE..GENESIS_SEQUENCE + len as u64 {
            let record = self.record(seq, previous_hash.as_deref());
            previous_hash = Some(record.hash.clone());
            records.push(record);
        }
        records
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
