//! Tests for MemoryStore
//!
//! These tests verify:
//! - Each primitive's contract (set-if-absent, get-and-replace, incr, ...)
//! - TTL behavior under a simulated clock
//! - Concurrent set-if-absent picks exactly one winner

use std::sync::Arc;
use std::thread;

use leasekv::{KeyValueStore, LeaseError, ManualClock, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> (Arc<ManualClock>, MemoryStore) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let store = MemoryStore::with_clock(clock.clone());
    (clock, store)
}

// =============================================================================
// Primitive Tests
// =============================================================================

#[test]
fn test_set_if_absent_only_first_wins() {
    let (_clock, store) = setup_store();

    assert!(store.set_if_absent("k", "first").unwrap());
    assert!(!store.set_if_absent("k", "second").unwrap());
    assert_eq!(store.get("k").unwrap(), Some("first".to_string()));
}

#[test]
fn test_get_missing_key() {
    let (_clock, store) = setup_store();
    assert_eq!(store.get("missing").unwrap(), None);
}

#[test]
fn test_get_and_replace_returns_previous() {
    let (_clock, store) = setup_store();

    assert_eq!(store.get_and_replace("k", "v1").unwrap(), None);
    assert_eq!(store.get_and_replace("k", "v2").unwrap(), Some("v1".to_string()));
    assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
}

#[test]
fn test_get_and_replace_clears_ttl() {
    let (_clock, store) = setup_store();

    store.set_if_absent_ex("k", "v1", 10).unwrap();
    assert_eq!(store.ttl("k").unwrap(), Some(10));

    store.get_and_replace("k", "v2").unwrap();
    assert_eq!(store.ttl("k").unwrap(), None);
}

#[test]
fn test_incr_from_absent_and_existing() {
    let (_clock, store) = setup_store();

    assert_eq!(store.incr("n").unwrap(), 1);
    assert_eq!(store.incr("n").unwrap(), 2);
    assert_eq!(store.get("n").unwrap(), Some("2".to_string()));
}

#[test]
fn test_incr_rejects_non_integer() {
    let (_clock, store) = setup_store();
    store.set_if_absent("k", "abc").unwrap();

    assert!(matches!(store.incr("k"), Err(LeaseError::NotAnInteger(_))));
}

#[test]
fn test_incr_keeps_ttl() {
    let (_clock, store) = setup_store();

    store.incr("n").unwrap();
    store.expire("n", 3).unwrap();
    store.incr("n").unwrap();

    assert_eq!(store.ttl("n").unwrap(), Some(3));
}

#[test]
fn test_delete_counts() {
    let (_clock, store) = setup_store();
    store.set_if_absent("k", "v").unwrap();

    assert_eq!(store.delete("k").unwrap(), 1);
    assert_eq!(store.delete("k").unwrap(), 0);
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_expire_missing_key() {
    let (_clock, store) = setup_store();
    assert!(!store.expire("missing", 5).unwrap());
}

#[test]
fn test_key_expires_after_ttl() {
    let (clock, store) = setup_store();

    store.set_if_absent("k", "v").unwrap();
    assert!(store.expire("k", 2).unwrap());

    clock.advance(1_999);
    assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

    clock.advance(1);
    assert_eq!(store.get("k").unwrap(), None);
    assert!(store.set_if_absent("k", "again").unwrap());
}

#[test]
fn test_ttl_counts_down() {
    let (clock, store) = setup_store();

    store.set_if_absent_ex("k", "v", 5).unwrap();
    clock.advance(2_500);

    assert_eq!(store.ttl("k").unwrap(), Some(3));
    assert_eq!(store.ttl("missing").unwrap(), None);
}

#[test]
fn test_expired_key_counts_as_deleted() {
    let (clock, store) = setup_store();

    store.set_if_absent_ex("k", "v", 1).unwrap();
    clock.advance(1_000);

    assert_eq!(store.delete("k").unwrap(), 0);
}

#[test]
fn test_purge_expired() {
    let (clock, store) = setup_store();

    store.set_if_absent_ex("short", "v", 1).unwrap();
    store.set_if_absent_ex("long", "v", 60).unwrap();
    store.set_if_absent("forever", "v").unwrap();
    assert_eq!(store.len(), 3);

    clock.advance(5_000);
    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.len(), 2);
    assert!(!store.is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_set_if_absent_single_winner() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.set_if_absent("contended", &t.to_string()).unwrap())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
}

#[test]
fn test_concurrent_incr_is_exact() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..250 {
                    store.incr("counter").unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get("counter").unwrap(), Some("1000".to_string()));
}
