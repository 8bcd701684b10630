//! Integration tests for remote relation loading
//!
//! These tests drive the public batch and lazy entry points with in-memory
//! fetchers standing in for an external API.
//!
//! Test relationships:
//! - User has_one Profile (remote, keyed by user_id)
//! - User has_many Posts (remote, keyed by user_id)
//! - Account has_one Subscription (remote, composite key)

use lifeguard_remote::{
    load_remote, resolve_many, resolve_one, FetchError, Identity, KeyValue, Model, Record,
    RelationError, RelationValue, RemoteModel, RemoteRelationDef, Value,
};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Helpers
// ============================================================================

/// Records every key list the fetcher receives
#[derive(Clone, Default)]
struct FetchLog(Arc<Mutex<Vec<Vec<KeyValue>>>>);

impl FetchLog {
    fn calls(&self) -> Vec<Vec<KeyValue>> {
        self.0.lock().unwrap().clone()
    }
}

/// Stand-in for an API client: logs the keys and answers with `rows`
fn recording_fetcher(
    log: FetchLog,
    rows: Vec<Record>,
) -> impl Fn(&[KeyValue], &Identity) -> Result<Vec<Record>, FetchError> + Send + Sync {
    move |keys: &[KeyValue], _: &Identity| {
        log.0.lock().unwrap().push(keys.to_vec());
        Ok(rows.clone())
    }
}

fn users(ids: &[Value]) -> Vec<Model> {
    ids.iter()
        .map(|id| Model::new(Record::new().with("id", id.clone())))
        .collect()
}

fn name_of(model: &Model, relation: &str) -> Option<Value> {
    model
        .relation(relation)
        .and_then(RelationValue::as_one)
        .and_then(|r| r.get("name"))
        .cloned()
}

#[derive(Debug)]
struct ApiDown;

impl fmt::Display for ApiDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api down")
    }
}

impl std::error::Error for ApiDown {}

// ============================================================================
// Batch loading
// ============================================================================

#[test]
fn test_has_one_scenario_matches_and_defaults() {
    let log = FetchLog::default();
    let profile = RemoteRelationDef::has_one("profile", "user_id")
        .with_fetcher(recording_fetcher(
            log.clone(),
            vec![
                Record::new().with("user_id", 1).with("name", "John"),
                Record::new().with("user_id", 3).with("name", "Bob"),
            ],
        ))
        .build()
        .unwrap();

    let mut parents = users(&[Value::Int(1), Value::Int(2), Value::Int(3)]);
    load_remote(&mut parents, &profile).unwrap();

    assert_eq!(
        parents[0].relation("profile").and_then(RelationValue::as_one),
        Some(&Record::new().with("user_id", 1).with("name", "John"))
    );
    assert_eq!(parents[1].relation("profile"), Some(&RelationValue::One(None)));
    assert_eq!(name_of(&parents[2], "profile"), Some(Value::from("Bob")));
    assert_eq!(log.calls().len(), 1);
}

#[test]
fn test_has_many_scenario_groups_rows() {
    let log = FetchLog::default();
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(recording_fetcher(
            log.clone(),
            vec![
                Record::new().with("user_id", 1).with("title", "first"),
                Record::new().with("user_id", 1).with("title", "second"),
            ],
        ))
        .build()
        .unwrap();

    let mut parents = users(&[Value::Int(1), Value::Int(2)]);
    load_remote(&mut parents, &posts).unwrap();

    assert_eq!(parents[0].relation("posts").unwrap().as_many().len(), 2);
    assert_eq!(parents[1].relation("posts").unwrap().as_many().len(), 0);
}

#[test]
fn test_has_many_preserves_response_order() {
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(
            |_: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
                Ok(vec![
                    Record::new().with("user_id", 5).with("title", "c"),
                    Record::new().with("user_id", 5).with("title", "a"),
                    Record::new().with("user_id", 5).with("title", "b"),
                ])
            },
        )
        .build()
        .unwrap();

    let mut parents = users(&[Value::Int(5)]);
    load_remote(&mut parents, &posts).unwrap();

    let titles: Vec<&Value> = parents[0]
        .relation("posts")
        .unwrap()
        .as_many()
        .iter()
        .filter_map(|r| r.get("title"))
        .collect();
    assert_eq!(titles, vec![&Value::from("c"), &Value::from("a"), &Value::from("b")]);
}

#[test]
fn test_fetch_receives_each_distinct_key_once_in_order() {
    let log = FetchLog::default();
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(recording_fetcher(log.clone(), vec![]))
        .build()
        .unwrap();

    let mut parents = users(&[
        Value::Int(4),
        Value::Null,
        Value::Int(2),
        Value::Int(4),
        Value::Int(9),
        Value::Int(2),
    ]);
    load_remote(&mut parents, &posts).unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        vec![
            KeyValue::Single(Value::Int(4)),
            KeyValue::Single(Value::Int(2)),
            KeyValue::Single(Value::Int(9)),
        ]
    );
    assert!(parents.iter().all(|p| p.relation_loaded("posts")));
}

#[test]
fn test_single_fetch_for_large_batch() {
    let log = FetchLog::default();
    let profile = RemoteRelationDef::has_one("profile", "user_id")
        .with_fetcher(recording_fetcher(log.clone(), vec![]))
        .build()
        .unwrap();

    let ids: Vec<Value> = (0..250).map(|i| Value::Int(i % 40)).collect();
    let mut parents = users(&ids);
    load_remote(&mut parents, &profile).unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 40);
}

#[test]
fn test_all_null_keys_skip_fetch() {
    let log = FetchLog::default();
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(recording_fetcher(log.clone(), vec![]))
        .build()
        .unwrap();

    let mut parents = users(&[Value::Null, Value::Null]);
    load_remote(&mut parents, &posts).unwrap();

    assert!(log.calls().is_empty());
    assert!(parents
        .iter()
        .all(|p| p.relation("posts") == Some(&RelationValue::Many(vec![]))));
}

#[test]
fn test_composite_key_matches_regardless_of_field_order() {
    let log = FetchLog::default();
    let subscription = RemoteRelationDef::has_one("subscription", ["a", "b"])
        .local_key(["a", "b"])
        .with_fetcher(recording_fetcher(
            log.clone(),
            vec![
                Record::new()
                    .with("plan", "gold")
                    .with("b", 100)
                    .with("a", 2)
                    .with("name", "match"),
                Record::new().with("a", 2).with("name", "incomplete"),
            ],
        ))
        .build()
        .unwrap();

    let mut parents = vec![
        Model::new(Record::new().with("a", 2).with("b", 100)),
        Model::new(Record::new().with("a", 2).with("b", Value::Null)),
        Model::new(Record::new().with("b", 100).with("a", 2)),
    ];
    load_remote(&mut parents, &subscription).unwrap();

    assert_eq!(log.calls()[0].len(), 1);
    assert_eq!(name_of(&parents[0], "subscription"), Some(Value::from("match")));
    assert_eq!(parents[1].relation("subscription"), Some(&RelationValue::One(None)));
    assert_eq!(name_of(&parents[2], "subscription"), Some(Value::from("match")));
}

#[test]
fn test_case_insensitive_option() {
    let rows = vec![Record::new().with("code", "abc").with("name", "lower")];

    let insensitive = RemoteRelationDef::has_one("item", "code")
        .local_key("code")
        .case_insensitive(true)
        .with_fetcher(recording_fetcher(FetchLog::default(), rows.clone()))
        .build()
        .unwrap();
    let sensitive = RemoteRelationDef::has_one("item", "code")
        .local_key("code")
        .with_fetcher(
            move |_: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
                Ok(rows.clone())
            },
        )
        .build()
        .unwrap();

    for code in ["ABC", "Abc", "abc"] {
        let mut parents = vec![Model::new(Record::new().with("code", code))];
        load_remote(&mut parents, &insensitive).unwrap();
        assert_eq!(name_of(&parents[0], "item"), Some(Value::from("lower")), "{code}");
    }

    let mut parents = vec![
        Model::new(Record::new().with("code", "ABC")),
        Model::new(Record::new().with("code", "abc")),
    ];
    load_remote(&mut parents, &sensitive).unwrap();
    assert_eq!(name_of(&parents[0], "item"), None);
    assert_eq!(name_of(&parents[1], "item"), Some(Value::from("lower")));
}

#[test]
fn test_integer_parent_key_matches_string_api_id() {
    let profile = RemoteRelationDef::has_one("profile", "user_id")
        .with_fetcher(
            |_: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
                let row = Record::try_from(json!({ "user_id": "7", "name": "Str" }))?;
                Ok(vec![row])
            },
        )
        .build()
        .unwrap();

    let mut parents = users(&[Value::Int(7)]);
    load_remote(&mut parents, &profile).unwrap();
    assert_eq!(name_of(&parents[0], "profile"), Some(Value::from("Str")));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_fetch_failure_propagates_and_attaches_nothing() {
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(
            |_: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
                Err(Box::new(ApiDown))
            },
        )
        .build()
        .unwrap();

    let mut parents = users(&[Value::Int(1), Value::Int(2)]);
    let err = load_remote(&mut parents, &posts).unwrap_err();

    assert_eq!(err.relation(), "posts");
    let original = err.into_fetch_error().unwrap();
    assert!(original.downcast_ref::<ApiDown>().is_some());
    assert!(parents.iter().all(|p| !p.relation_loaded("posts")));
}

#[test]
fn test_missing_fetcher_only_fails_when_fetch_needed() {
    let profile = RemoteRelationDef::has_one("profile", "user_id").build().unwrap();

    let mut without_keys = users(&[Value::Null]);
    assert!(load_remote(&mut without_keys, &profile).is_ok());

    let mut with_keys = users(&[Value::Int(1)]);
    assert!(matches!(
        load_remote(&mut with_keys, &profile),
        Err(RelationError::MissingFetcher { .. })
    ));
    assert!(matches!(
        resolve_one(&with_keys[0], &profile),
        Err(RelationError::MissingFetcher { .. })
    ));
}

// ============================================================================
// Lazy loading
// ============================================================================

#[test]
fn test_lazy_resolution_calls_fetch_at_most_once() {
    let log = FetchLog::default();
    let posts = RemoteRelationDef::has_many("posts", "user_id")
        .with_fetcher(recording_fetcher(
            log.clone(),
            vec![
                Record::new().with("user_id", 1).with("title", "a"),
                Record::new().with("user_id", 1).with("title", "b"),
            ],
        ))
        .build()
        .unwrap();

    let user = Model::new(Record::new().with("id", 1));
    assert_eq!(resolve_many(&user, &posts).unwrap().len(), 2);
    assert_eq!(log.calls(), vec![vec![KeyValue::Single(Value::Int(1))]]);

    let nobody = Model::new(Record::new().with("id", Value::Null));
    assert!(resolve_many(&nobody, &posts).unwrap().is_empty());
    assert_eq!(log.calls().len(), 1);
}

// ============================================================================
// Host models
// ============================================================================

/// A host model that stores attributes in its own fields
#[derive(Default)]
struct Invoice {
    id: Value,
    customer_ref: Value,
    loaded: HashMap<String, RelationValue>,
}

impl RemoteModel for Invoice {
    fn get_field(&self, field: &str) -> Option<&Value> {
        match field {
            "id" => Some(&self.id),
            "customer_ref" => Some(&self.customer_ref),
            _ => None,
        }
    }

    fn set_relation(&mut self, relation: &str, value: RelationValue) {
        self.loaded.insert(relation.to_string(), value);
    }
}

#[test]
fn test_custom_host_model() {
    let customer = RemoteRelationDef::has_one("customer", "ref")
        .local_key("customer_ref")
        .case_insensitive(true)
        .with_fetcher(
            |keys: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
                assert_eq!(keys.len(), 2);
                Ok(vec![Record::new().with("ref", "cus_a").with("name", "Acme")])
            },
        )
        .build()
        .unwrap();

    let mut invoices = vec![
        Invoice {
            id: Value::Int(1),
            customer_ref: Value::from("CUS_A"),
            ..Default::default()
        },
        Invoice {
            id: Value::Int(2),
            customer_ref: Value::from("cus_a"),
            ..Default::default()
        },
        Invoice {
            id: Value::Int(3),
            customer_ref: Value::Null,
            ..Default::default()
        },
    ];
    load_remote(&mut invoices, &customer).unwrap();

    assert!(invoices[0].loaded["customer"].as_one().is_some());
    assert!(invoices[1].loaded["customer"].as_one().is_some());
    assert!(invoices[2].loaded["customer"].is_empty());
}
