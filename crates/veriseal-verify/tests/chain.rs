//! End-to-end chain verification scenarios over real sealed records.

use std::time::Duration;

use veriseal_testkit::TestFixture;
use veriseal_verify::credential::memory::{FlakyKeySource, StaticKeySource};
use veriseal_verify::{
    verify_chain_with_key, ChainScope, CredentialError, VerificationFailure, Verifier,
};

fn fixture() -> TestFixture {
    TestFixture::with_seed([0x42; 32])
}

fn verifier(fixture: &TestFixture) -> Verifier<StaticKeySource> {
    Verifier::new(StaticKeySource::new(fixture.public_key_hex()))
}

#[tokio::test]
async fn valid_three_record_chain() {
    let fixture = fixture();
    let records = fixture.chain(3);

    let report = verifier(&fixture).verify_chain(&records).await.unwrap();

    assert!(report.valid);
    assert_eq!(report.total_records, 3);
    assert_eq!(report.valid_records, 3);
    assert_eq!(report.invalid_records, 0);
    assert_eq!(report.broken_at, None);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn input_order_does_not_affect_result() {
    let fixture = fixture();
    let records = fixture.chain(5);
    let mut shuffled = records.clone();
    shuffled.reverse();
    shuffled.swap(0, 2);

    let verifier = verifier(&fixture);
    let sorted_report = verifier.verify_chain(&records).await.unwrap();
    let shuffled_report = verifier.verify_chain(&shuffled).await.unwrap();

    assert_eq!(sorted_report, shuffled_report);
    assert!(sorted_report.valid);
}

#[tokio::test]
async fn broken_link_reports_chain_broken_at_three() {
    let fixture = fixture();
    let mut records = fixture.chain(3);
    // Record 3 relinks to a forged predecessor hash. Its own content and
    // signature must be re-sealed so only the linkage is at fault.
    records[2] = fixture.record(3, Some(&"f".repeat(64)));

    let report = verifier(&fixture).verify_chain(&records).await.unwrap();

    assert!(!report.valid);
    assert_eq!(report.total_records, 3);
    assert_eq!(report.valid_records, 2);
    assert_eq!(report.invalid_records, 1);
    assert_eq!(report.broken_at, Some(3));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].failure,
        VerificationFailure::ChainBroken { .. }
    ));
}

#[tokio::test]
async fn sequence_gap_reported_and_linkage_skipped() {
    let fixture = fixture();
    let r1 = fixture.record(1, None);
    let r2 = fixture.record(2, Some(&r1.hash));
    // Jump straight to 5 with a previous-hash that would also fail the
    // linkage check; only the gap may be reported.
    let r5 = fixture.record(5, Some(&"0".repeat(64)));

    let report = verifier(&fixture)
        .verify_chain(&[r1, r2, r5])
        .await
        .unwrap();

    assert!(!report.valid);
    assert_eq!(report.valid_records, 2);
    assert_eq!(report.invalid_records, 1);
    assert_eq!(report.broken_at, Some(5));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].failure,
        VerificationFailure::SequenceGap {
            expected: 3,
            got: 5
        }
    ));
}

#[tokio::test]
async fn single_corruption_does_not_cascade() {
    let fixture = fixture();
    let mut records = fixture.chain(5);
    // Corrupt record 3's content after sealing. Its successors still link
    // to its *declared* hash, so they must stay valid.
    records[2].action = "user.impersonate".into();

    let report = verifier(&fixture).verify_chain(&records).await.unwrap();

    assert!(!report.valid);
    assert_eq!(report.total_records, 5);
    assert_eq!(report.valid_records, 4);
    assert_eq!(report.invalid_records, 1);
    assert_eq!(report.broken_at, Some(3));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].failure,
        VerificationFailure::HashMismatch { .. }
    ));
}

#[tokio::test]
async fn genesis_with_previous_hash_fails() {
    let fixture = fixture();
    let bad_genesis = fixture.record(1, Some(&"a".repeat(64)));

    let report = verifier(&fixture)
        .verify_chain(&[bad_genesis])
        .await
        .unwrap();

    assert!(!report.valid);
    assert_eq!(report.broken_at, Some(1));
    assert!(matches!(
        report.failures[0].failure,
        VerificationFailure::GenesisPreviousHash
    ));
}

#[tokio::test]
async fn genesis_without_previous_hash_passes() {
    let fixture = fixture();
    let genesis = fixture.record(1, None);

    let report = verifier(&fixture).verify_chain(&[genesis]).await.unwrap();
    assert!(report.valid);
}

#[tokio::test]
async fn range_mode_accepts_interior_slice() {
    let fixture = fixture();
    let records = fixture.chain(6);
    let slice = &records[2..5];

    let verifier = verifier(&fixture);
    let range = verifier.verify_range(slice).await.unwrap();
    assert!(range.valid);

    // The same slice must not pass as a complete chain.
    let complete = verifier.verify_chain(slice).await.unwrap();
    assert!(!complete.valid);
    assert!(matches!(
        complete.failures[0].failure,
        VerificationFailure::StartsAfterGenesis { first: 3, .. }
    ));
}

#[tokio::test]
async fn tampered_signature_detected_per_record() {
    let fixture = fixture();
    let mut records = fixture.chain(2);
    records[1].signature = records[0].signature.clone();

    let verifier = verifier(&fixture);
    let single = verifier.verify_record(&records[1]).await.unwrap();
    assert!(!single.valid);
    assert!(single.hash_valid);
    assert!(!single.signature_valid);

    let report = verifier.verify_chain(&records).await.unwrap();
    assert_eq!(report.valid_records, 1);
    assert!(matches!(
        report.failures[0].failure,
        VerificationFailure::SignatureInvalid
    ));
}

#[test]
fn pure_chain_verification_without_a_runtime() {
    let fixture = fixture();
    let records = fixture.chain(3);

    let report = verify_chain_with_key(
        &records,
        &fixture.keypair.public_key(),
        ChainScope::Complete,
    );
    assert!(report.valid);
}

#[tokio::test]
async fn concurrent_verification_fetches_key_once() {
    let fixture = fixture();
    let records = fixture.chain(2);
    let source =
        StaticKeySource::new(fixture.public_key_hex()).with_delay(Duration::from_millis(20));
    let verifier = Verifier::new(source);

    let (a, b) = tokio::join!(
        verifier.verify_record(&records[0]),
        verifier.verify_record(&records[1])
    );

    assert!(a.unwrap().valid);
    assert!(b.unwrap().valid);
    assert_eq!(verifier.credentials().source().fetch_count(), 1);
}

#[tokio::test]
async fn fetch_failure_is_error_not_finding_and_retry_works() {
    let fixture = fixture();
    let records = fixture.chain(2);
    let source = FlakyKeySource::new(fixture.public_key_hex(), 1);
    let verifier = Verifier::new(source);

    let err = verifier.verify_chain(&records).await.unwrap_err();
    assert!(matches!(err, CredentialError::Fetch(_)));

    // The failed fetch reset the cache; the retry succeeds and the records
    // were never misreported as invalid.
    let report = verifier.verify_chain(&records).await.unwrap();
    assert!(report.valid);
    assert_eq!(verifier.credentials().source().fetch_count(), 2);
}
