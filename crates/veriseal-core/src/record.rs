//! The audit record: an immutable, server-sealed log entry.
//!
//! Records arrive from the audit service already hashed and signed. The
//! verifier recomputes the content digest from the fields listed in
//! [`AuditRecord::content_value`] and never mutates a record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::{canonical_bytes, CanonicalValue};
use crate::crypto::{ContentHash, Keypair};

/// Sequence number assigned to the first record of a chain.
pub const GENESIS_SEQUENCE: u64 = 1;

/// Outcome of the audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionResult {
    Success,
    Failure,
    Denied,
    Error,
}

impl ActionResult {
    /// The wire spelling, also used in canonical encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionResult::Success => "SUCCESS",
            ActionResult::Failure => "FAILURE",
            ActionResult::Denied => "DENIED",
            ActionResult::Error => "ERROR",
        }
    }
}

/// The entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The entity being acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// One field-level change recorded with an action.
///
/// Values default to JSON null; the service materializes both sides of a
/// change even when one is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    #[serde(default)]
    pub old_value: Value,
    #[serde(default)]
    pub new_value: Value,
}

/// An audit log record as served by the audit service.
///
/// `sequence_number` is server-assigned and strictly increasing within a
/// project; `previous_hash` links each record to its predecessor, absent
/// only for the genesis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Storage identifier; never part of the content digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    pub sequence_number: u64,
    /// Digest of the preceding record, absent only at the genesis sequence.
    #[serde(default)]
    pub previous_hash: Option<String>,
    /// Lowercase hex digest the verifier must reproduce from the content.
    pub hash: String,
    /// Base64 signature over the textual `hash`.
    pub signature: String,
    /// Server-assigned time, kept verbatim as wire text so the canonical
    /// bytes match what the producer hashed.
    pub timestamp: String,
    /// Optional client-supplied event time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    pub action: String,
    pub result: ActionResult,
    pub actor: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AuditRecord {
    /// The canonical value over the record's content fields.
    ///
    /// Included: project id, sequence number, previous hash, timestamps,
    /// action, result, actor, target, changes, context, metadata.
    /// Excluded: `id`, `hash`, `signature`.
    pub fn content_value(&self) -> CanonicalValue {
        let entries = vec![
            (
                "projectId".to_string(),
                CanonicalValue::String(self.project_id.clone()),
            ),
            (
                "sequenceNumber".to_string(),
                CanonicalValue::Number(self.sequence_number.into()),
            ),
            (
                "previousHash".to_string(),
                optional_string(&self.previous_hash),
            ),
            (
                "timestamp".to_string(),
                CanonicalValue::String(self.timestamp.clone()),
            ),
            ("eventTime".to_string(), optional_string(&self.event_time)),
            (
                "action".to_string(),
                CanonicalValue::String(self.action.clone()),
            ),
            (
                "result".to_string(),
                CanonicalValue::String(self.result.as_str().to_string()),
            ),
            (
                "actor".to_string(),
                entity_value(&self.actor.id, &self.actor.kind, &self.actor.display_name),
            ),
            (
                "target".to_string(),
                match &self.target {
                    Some(t) => entity_value(&t.id, &t.kind, &t.display_name),
                    None => CanonicalValue::Null,
                },
            ),
            (
                "changes".to_string(),
                CanonicalValue::Array(self.changes.iter().map(change_value).collect()),
            ),
            ("context".to_string(), object_value(&self.context)),
            ("metadata".to_string(), object_value(&self.metadata)),
        ];
        CanonicalValue::Map(entries)
    }

    /// Recompute the content digest from the record's fields.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::hash(&canonical_bytes(&self.content_value()))
    }

    /// Whether this record sits at the chain's starting sequence.
    pub fn is_genesis(&self) -> bool {
        self.sequence_number == GENESIS_SEQUENCE
    }
}

fn optional_string(value: &Option<String>) -> CanonicalValue {
    match value {
        Some(s) => CanonicalValue::String(s.clone()),
        None => CanonicalValue::Null,
    }
}

/// Actor/target shape: `display_name` is omitted entirely when absent, the
/// way the producer serializes these entities.
fn entity_value(id: &str, kind: &str, display_name: &Option<String>) -> CanonicalValue {
    let mut entries = vec![
        ("id".to_string(), CanonicalValue::String(id.to_string())),
        ("type".to_string(), CanonicalValue::String(kind.to_string())),
    ];
    if let Some(name) = display_name {
        entries.push((
            "display_name".to_string(),
            CanonicalValue::String(name.clone()),
        ));
    }
    CanonicalValue::Map(entries)
}

fn change_value(change: &Change) -> CanonicalValue {
    CanonicalValue::Map(vec![
        (
            "path".to_string(),
            CanonicalValue::String(change.path.clone()),
        ),
        ("old_value".to_string(), (&change.old_value).into()),
        ("new_value".to_string(), (&change.new_value).into()),
    ])
}

fn object_value(map: &Map<String, Value>) -> CanonicalValue {
    CanonicalValue::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), CanonicalValue::from(v)))
            .collect(),
    )
}

/// Builder for producing sealed records.
///
/// `seal` computes the content digest, stores its hex form as `hash`, and
/// signs that hex string, the same convention the audit service uses.
pub struct RecordBuilder {
    project_id: String,
    sequence_number: u64,
    previous_hash: Option<String>,
    timestamp: String,
    event_time: Option<String>,
    action: String,
    result: ActionResult,
    actor: Actor,
    target: Option<Target>,
    changes: Vec<Change>,
    context: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl RecordBuilder {
    /// Start building a record.
    pub fn new(project_id: impl Into<String>, sequence_number: u64) -> Self {
        Self {
            project_id: project_id.into(),
            sequence_number,
            previous_hash: None,
            timestamp: "1970-01-01T00:00:00.000Z".to_string(),
            event_time: None,
            action: String::new(),
            result: ActionResult::Success,
            actor: Actor {
                id: String::new(),
                kind: "system".to_string(),
                display_name: None,
            },
            target: None,
            changes: Vec::new(),
            context: Map::new(),
            metadata: Map::new(),
        }
    }

    /// Set the previous record's hash.
    pub fn previous_hash(mut self, hash: impl Into<String>) -> Self {
        self.previous_hash = Some(hash.into());
        self
    }

    /// Set the server timestamp.
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Set the client event time.
    pub fn event_time(mut self, event_time: impl Into<String>) -> Self {
        self.event_time = Some(event_time.into());
        self
    }

    /// Set the action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Set the action result.
    pub fn result(mut self, result: ActionResult) -> Self {
        self.result = result;
        self
    }

    /// Set the actor.
    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    /// Set the target.
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Append a change entry. Order is preserved.
    pub fn change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    /// Add a context entry.
    pub fn context_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Add a metadata entry.
    pub fn metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Compute the content digest, sign it, and return the sealed record.
    pub fn seal(self, keypair: &Keypair) -> AuditRecord {
        let mut record = AuditRecord {
            id: None,
            project_id: self.project_id,
            sequence_number: self.sequence_number,
            previous_hash: self.previous_hash,
            hash: String::new(),
            signature: String::new(),
            timestamp: self.timestamp,
            event_time: self.event_time,
            action: self.action,
            result: self.result,
            actor: self.actor,
            target: self.target,
            changes: self.changes,
            context: self.context,
            metadata: self.metadata,
        };
        let hash = record.content_hash().to_hex();
        record.signature = keypair.sign(hash.as_bytes()).to_base64();
        record.hash = hash;
        record
    }
}
