//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::Value;

use veriseal_core::{ActionResult, Actor, AuditRecord, Keypair, RecordBuilder};

/// Generate an action name like "user.login".
pub fn action() -> impl Strategy<Value = String> {
    "[a-z]{3,8}\\.[a-z]{3,10}".prop_map(String::from)
}

/// Generate an action result.
pub fn action_result() -> impl Strategy<Value = ActionResult> {
    prop_oneof![
        Just(ActionResult::Success),
        Just(ActionResult::Failure),
        Just(ActionResult::Denied),
        Just(ActionResult::Error),
    ]
}

/// Generate a JSON leaf value. Floats are excluded so textual renderings
/// stay stable under equality.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::from),
    ]
}

/// Generate a JSON value tree up to the given depth.
pub fn json_value(depth: u32) -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(depth, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Parameters for generating a sealed record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub seed: [u8; 32],
    pub project_id: String,
    pub sequence_number: u64,
    pub action: String,
    pub result: ActionResult,
    pub actor_id: String,
    pub context: Vec<(String, Value)>,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            "proj_[a-z0-9]{4,8}",
            1u64..=10_000u64,
            action(),
            action_result(),
            "user_[a-z0-9]{4,8}",
            prop::collection::vec(("[a-z]{1,8}", json_value(2)), 0..4),
        )
            .prop_map(
                |(seed, project_id, sequence_number, action, result, actor_id, context)| {
                    RecordParams {
                        seed,
                        project_id,
                        sequence_number,
                        action,
                        result,
                        actor_id,
                        context,
                    }
                },
            )
            .boxed()
    }
}

/// Seal a record from parameters.
pub fn record_from_params(params: &RecordParams) -> AuditRecord {
    let mut builder = RecordBuilder::new(&params.project_id, params.sequence_number)
        .timestamp("2024-05-01T10:00:00Z")
        .action(&params.action)
        .result(params.result)
        .actor(Actor {
            id: params.actor_id.clone(),
            kind: "user".into(),
            display_name: None,
        });
    for (key, value) in &params.context {
        builder = builder.context_entry(key, value.clone());
    }
    builder.seal(&Keypair::from_seed(&params.seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriseal_core::canonical::{canonical_string, CanonicalValue};

    proptest! {
        #[test]
        fn test_content_hash_deterministic(params: RecordParams) {
            let r1 = record_from_params(&params);
            let r2 = record_from_params(&params);

            prop_assert_eq!(&r1.hash, &r2.hash);
            prop_assert_eq!(&r1.signature, &r2.signature);
        }

        #[test]
        fn test_content_hash_sensitive_to_action(
            params: RecordParams,
            other_action in action(),
        ) {
            prop_assume!(params.action != other_action);

            let original = record_from_params(&params);
            let mut changed = params.clone();
            changed.action = other_action;
            let changed = record_from_params(&changed);

            prop_assert_ne!(original.hash, changed.hash);
        }

        #[test]
        fn test_canonical_map_insertion_order_erased(
            entries in prop::collection::btree_map("[a-z]{1,8}", json_value(2), 0..6),
        ) {
            let forward: Vec<(String, CanonicalValue)> = entries
                .iter()
                .map(|(k, v)| (k.clone(), CanonicalValue::from(v)))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            prop_assert_eq!(
                canonical_string(&CanonicalValue::Map(forward)),
                canonical_string(&CanonicalValue::Map(backward))
            );
        }

        #[test]
        fn test_sealed_records_verify_own_hash(params: RecordParams) {
            let record = record_from_params(&params);
            prop_assert_eq!(record.content_hash().to_hex(), record.hash);
        }
    }
}
