//! Integration tests for applying policies to whole tables
//!
//! These tests verify that:
//! - Declared and present fields are masked, everything else is copied
//! - Absent fields are skipped without error
//! - Failures and cancellation return no table and leave the store untouched
//! - Reverse mappings from several runs accumulate in one store

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tabmask::adapters::generate_employee_table;
use tabmask::domain::{Column, MaskingError, Scalar, Table};
use tabmask::masking::{
    EncryptionKey, MaskingEngine, MaskingPolicy, MaskingProgress, MaskingRule, NoProgress,
    ReversibleStore, RuleDocument,
};
use tokio::sync::watch;

fn employees() -> Table {
    Table::new(vec![
        Column::new(
            "name",
            vec![Scalar::from("Ada Lovelace"), Scalar::from("Grace Hopper")],
        ),
        Column::new(
            "email",
            vec![Scalar::from("ada@example.com"), Scalar::Null],
        ),
        Column::new(
            "ssn",
            vec![Scalar::from("123-45-6789"), Scalar::from("987-65-4321")],
        ),
        Column::new(
            "salary",
            vec![Scalar::from(50000_i64), Scalar::from(72000_i64)],
        ),
    ])
    .unwrap()
}

#[test]
fn test_masks_declared_fields_and_copies_the_rest() {
    let table = employees();
    let mut policy = MaskingPolicy::new();
    policy.set_rule("email", MaskingRule::EmailMask).unwrap();
    policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();
    policy.set_rule("department", MaskingRule::FullMask).unwrap();

    let store = ReversibleStore::new();
    let outcome = MaskingEngine::with_seed(5)
        .apply(&table, &policy, &store, &mut NoProgress)
        .unwrap();

    let masked = &outcome.table;
    assert_eq!(masked.column_names(), table.column_names());
    assert_eq!(masked.column("name"), table.column("name"));
    assert_eq!(masked.column("salary"), table.column("salary"));
    assert_eq!(
        masked.column("email").unwrap().values(),
        &[Scalar::from("a*a@example.com"), Scalar::Null]
    );
    assert_eq!(
        masked.column("ssn").unwrap().values(),
        &[Scalar::from("***-**-6789"), Scalar::from("***-**-4321")]
    );
    assert!(!masked.contains_column("department"));

    // input is untouched
    assert_eq!(table, employees());

    let summary = &outcome.summary;
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.skipped_fields, vec!["department".to_string()]);
    assert_eq!(summary.field("email").unwrap().values_masked, 1);
    assert_eq!(summary.field("email").unwrap().nulls_skipped, 1);
    assert_eq!(summary.total_masked(), 3);
    assert!(store.is_empty());
}

#[test]
fn test_zero_rules_returns_identical_table() {
    let table = employees();
    let mut events = 0;
    let outcome = MaskingEngine::new()
        .apply(
            &table,
            &MaskingPolicy::new(),
            &ReversibleStore::new(),
            &mut |_: &MaskingProgress| events += 1,
        )
        .unwrap();

    assert_eq!(outcome.table, table);
    assert_eq!(events, 0);
}

#[test]
fn test_progress_fraction_per_declared_field() {
    let mut policy = MaskingPolicy::new();
    policy.set_rule("name", MaskingRule::Hash).unwrap();
    policy.set_rule("missing", MaskingRule::FullMask).unwrap();
    policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();
    policy.set_rule("salary", MaskingRule::FullMask).unwrap();

    let mut seen: Vec<(String, f64)> = Vec::new();
    MaskingEngine::new()
        .apply(
            &employees(),
            &policy,
            &ReversibleStore::new(),
            &mut |p: &MaskingProgress| seen.push((p.field.clone(), p.fraction)),
        )
        .unwrap();

    assert_eq!(
        seen,
        vec![
            ("name".to_string(), 0.25),
            ("missing".to_string(), 0.5),
            ("ssn".to_string(), 0.75),
            ("salary".to_string(), 1.0),
        ]
    );
}

#[test]
fn test_bad_key_aborts_without_partial_output() {
    let good_key = EncryptionKey::generate();
    let mut policy = MaskingPolicy::new();
    policy
        .set_rule("ssn", MaskingRule::ReversibleEncrypt { key: good_key })
        .unwrap();
    policy
        .set_rule_document(
            "email",
            &RuleDocument::new("reversible_encrypt").with_option("key", "not-a-real-key"),
        )
        .unwrap();

    let store = ReversibleStore::new();
    let err = MaskingEngine::new()
        .apply(&employees(), &policy, &store, &mut NoProgress)
        .unwrap_err();

    assert!(matches!(err, MaskingError::Failure { .. }));
    assert_eq!(err.field(), Some("email"));
    assert!(store.is_empty(), "ssn entries must not be committed");
}

#[test]
fn test_cancellation_between_fields() {
    let mut policy = MaskingPolicy::new();
    policy.set_rule("name", MaskingRule::FullMask).unwrap();
    policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();

    let (tx, rx) = watch::channel(false);
    let mut progress = |p: &MaskingProgress| {
        if p.fields_done == 1 {
            let _ = tx.send(true);
        }
    };

    let err = MaskingEngine::new()
        .apply_with_shutdown(
            &employees(),
            &policy,
            &ReversibleStore::new(),
            &mut progress,
            &rx,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        MaskingError::Cancelled {
            fields_done: 1,
            total_fields: 2
        }
    ));
}

#[test]
fn test_reverse_mappings_accumulate_across_runs() {
    let key = EncryptionKey::generate();
    let mut policy = MaskingPolicy::new();
    policy
        .set_rule("ssn", MaskingRule::FormatPreservingEncrypt { key })
        .unwrap();

    let store = ReversibleStore::new();
    let mut engine = MaskingEngine::new();
    engine
        .apply(&employees(), &policy, &store, &mut NoProgress)
        .unwrap();
    let second = engine
        .apply(&employees(), &policy, &store, &mut NoProgress)
        .unwrap();

    assert_eq!(store.len(), 4, "fresh nonces give distinct tokens per run");
    assert_eq!(second.summary.reverse_entries, 2);
    for token in second.table.column("ssn").unwrap().values() {
        let original = store.get("ssn", &token.to_string()).unwrap();
        assert!(original == "123-45-6789" || original == "987-65-4321");
    }

    let exported = store.export();
    assert_eq!(exported["ssn"].as_object().unwrap().len(), 4);
}

#[test]
fn test_concurrent_runs_share_one_store() {
    let key = EncryptionKey::generate();
    let mut policy = MaskingPolicy::new();
    policy
        .set_rule("ssn", MaskingRule::ReversibleEncrypt { key })
        .unwrap();
    let policy = Arc::new(policy);
    let store = Arc::new(ReversibleStore::new());

    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let policy = Arc::clone(&policy);
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let table = generate_employee_table(25, &mut StdRng::seed_from_u64(seed));
                MaskingEngine::with_seed(seed)
                    .apply(&table, &policy, &store, &mut NoProgress)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.len(), 100);
    assert_eq!(store.collisions(), 0);
}

#[test]
fn test_seeded_engine_reproduces_fake_data() {
    let table = generate_employee_table(10, &mut StdRng::seed_from_u64(9));
    let mut policy = MaskingPolicy::new();
    policy.set_rule("first_name", MaskingRule::FakeReplace).unwrap();
    policy.set_rule("salary", MaskingRule::NumberRandomize).unwrap();

    let a = MaskingEngine::with_seed(77)
        .apply(&table, &policy, &ReversibleStore::new(), &mut NoProgress)
        .unwrap();
    let b = MaskingEngine::with_seed(77)
        .apply(&table, &policy, &ReversibleStore::new(), &mut NoProgress)
        .unwrap();

    assert_eq!(a.table, b.table);
}
