//! Script Tests
//!
//! Built-in scripts run through MemoryStore, plus registry lookup.

use std::sync::Arc;

use leasekv::script::{CompareAndDeleteScript, FixedWindowScript, Script, ScriptRegistry};
use leasekv::{KeyValueStore, LeaseError, ManualClock, MemoryStore, Value};

fn setup_store() -> (Arc<ManualClock>, MemoryStore) {
    let clock = Arc::new(ManualClock::new(5_000));
    let store = MemoryStore::with_clock(clock.clone());
    (clock, store)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// fixed_window_limit
// =============================================================================

#[test]
fn test_fixed_window_admits_up_to_limit() {
    let (_clock, store) = setup_store();
    let keys = strings(&["ip:5"]);
    let args = strings(&["3"]);

    let replies: Vec<Value> = (0..5)
        .map(|_| store.run_script(&FixedWindowScript, &keys, &args).unwrap())
        .collect();

    assert_eq!(
        replies,
        vec![
            Value::Int(1),
            Value::Int(1),
            Value::Int(1),
            Value::Int(0),
            Value::Int(0)
        ]
    );
    // Rejected calls still count
    assert_eq!(store.get("ip:5").unwrap(), Some("5".to_string()));
}

#[test]
fn test_fixed_window_sets_ttl_on_creation() {
    let (clock, store) = setup_store();
    let keys = strings(&["ip:5"]);

    store
        .run_script(&FixedWindowScript, &keys, &strings(&["10", "4"]))
        .unwrap();
    assert_eq!(store.ttl("ip:5").unwrap(), Some(4));

    // Later increments don't push the expiry out
    clock.advance(2_000);
    store
        .run_script(&FixedWindowScript, &keys, &strings(&["10", "4"]))
        .unwrap();
    assert_eq!(store.ttl("ip:5").unwrap(), Some(2));
}

#[test]
fn test_fixed_window_default_ttl() {
    let (_clock, store) = setup_store();

    store
        .run_script(&FixedWindowScript, &strings(&["w"]), &strings(&["1"]))
        .unwrap();

    assert_eq!(
        store.ttl("w").unwrap(),
        Some(FixedWindowScript::DEFAULT_WINDOW_TTL_SECS)
    );
}

#[test]
fn test_fixed_window_window_key_reclaimed() {
    let (clock, store) = setup_store();

    store
        .run_script(&FixedWindowScript, &strings(&["w"]), &strings(&["1"]))
        .unwrap();
    clock.advance(2_000);

    assert_eq!(store.purge_expired(), 1);
    assert!(store.is_empty());
}

#[test]
fn test_fixed_window_bad_arguments() {
    let (_clock, store) = setup_store();

    let missing_key = store.run_script(&FixedWindowScript, &[], &strings(&["1"]));
    assert!(matches!(missing_key, Err(LeaseError::Script(_))));

    let missing_limit = store.run_script(&FixedWindowScript, &strings(&["w"]), &[]);
    assert!(matches!(missing_limit, Err(LeaseError::Script(_))));

    let bad_limit = store.run_script(&FixedWindowScript, &strings(&["w"]), &strings(&["ten"]));
    assert!(matches!(bad_limit, Err(LeaseError::Script(_))));
}

// =============================================================================
// compare_and_delete
// =============================================================================

#[test]
fn test_compare_and_delete_matching_token() {
    let (_clock, store) = setup_store();
    store.set_if_absent("lock_a", "123").unwrap();

    let reply = store
        .run_script(&CompareAndDeleteScript, &strings(&["lock_a"]), &strings(&["123"]))
        .unwrap();

    assert_eq!(reply, Value::Int(1));
    assert_eq!(store.get("lock_a").unwrap(), None);
}

#[test]
fn test_compare_and_delete_other_token() {
    let (_clock, store) = setup_store();
    store.set_if_absent("lock_a", "456").unwrap();

    let reply = store
        .run_script(&CompareAndDeleteScript, &strings(&["lock_a"]), &strings(&["123"]))
        .unwrap();

    assert_eq!(reply, Value::Int(0));
    assert_eq!(store.get("lock_a").unwrap(), Some("456".to_string()));
}

#[test]
fn test_compare_and_delete_missing_key() {
    let (_clock, store) = setup_store();

    let reply = store
        .run_script(&CompareAndDeleteScript, &strings(&["lock_a"]), &strings(&["123"]))
        .unwrap();

    assert_eq!(reply, Value::Int(0));
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_registry_builtins() {
    let registry = ScriptRegistry::with_builtins();

    assert_eq!(
        registry.names(),
        vec![CompareAndDeleteScript::NAME, FixedWindowScript::NAME]
    );
    assert_eq!(
        registry.get(FixedWindowScript::NAME).unwrap().name(),
        "fixed_window_limit"
    );
}

#[test]
fn test_registry_unknown_script() {
    let registry = ScriptRegistry::new();

    assert!(matches!(
        registry.get("fixed_window_limit"),
        Err(LeaseError::UnknownScript(_))
    ));
}
