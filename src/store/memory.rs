//! In-memory store
//!
//! HashMap-based keyspace behind a single `parking_lot::Mutex`.
//!
//! Expired entries are dropped lazily when touched, and in bulk by
//! [`MemoryStore::purge_expired`]. Scripts run while the mutex is held, so no
//! other primitive or script can interleave with them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{KeyValueStore, Value};
use crate::clock::{Clock, SystemClock};
use crate::error::{LeaseError, Result};
use crate::script::{Script, ScriptContext};

/// A stored value and its optional absolute expiry
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: Option<u64>,
}

impl Entry {
    fn is_live(&self, now_ms: u64) -> bool {
        self.expires_at_ms.map_or(true, |at| now_ms < at)
    }
}

/// In-process key-value store with per-key expiry
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store whose TTLs follow `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = self.clock.now_millis();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against the keyspace with the lock held
    fn with_session<T>(&self, f: impl FnOnce(&mut Session<'_>) -> T) -> T {
        let now_ms = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let mut session = Session {
            entries: &mut *entries,
            now_ms,
        };
        f(&mut session)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        Ok(self.with_session(|s| s.set_if_absent(key, value, None)))
    }

    fn set_if_absent_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool> {
        Ok(self.with_session(|s| s.set_if_absent(key, value, Some(ttl_secs))))
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.with_session(|s| s.get(key)))
    }

    fn get_and_replace(&self, key: &str, value: &str) -> Result<Option<String>> {
        Ok(self.with_session(|s| {
            let previous = s.get(key);
            s.set(key, value.to_string());
            previous
        }))
    }

    fn incr(&self, key: &str) -> Result<i64> {
        self.with_session(|s| s.incr(key))
    }

    fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        Ok(self.with_session(|s| s.expire(key, ttl_secs)))
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.with_session(|s| s.ttl(key)))
    }

    fn delete(&self, key: &str) -> Result<u64> {
        Ok(self.with_session(|s| s.delete(key)))
    }

    fn run_script(&self, script: &dyn Script, keys: &[String], args: &[String]) -> Result<Value> {
        tracing::trace!(script = script.name(), ?keys, ?args, "running script");
        self.with_session(|s| script.run(s, keys, args))
    }
}

// =============================================================================
// Session: keyspace view pinned to one timestamp
// =============================================================================

/// Locked keyspace plus the time the operation started
struct Session<'a> {
    entries: &'a mut HashMap<String, Entry>,
    now_ms: u64,
}

impl Session<'_> {
    /// Live entry for `key`, evicting it first if it has expired
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_live(self.now_ms));
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key)
    }

    fn set_if_absent(&mut self, key: &str, value: &str, ttl_secs: Option<u64>) -> bool {
        if self.live(key).is_some() {
            return false;
        }
        let expires_at_ms = ttl_secs.map(|secs| self.expiry_for(secs));
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        true
    }

    fn expiry_for(&self, ttl_secs: u64) -> u64 {
        self.now_ms.saturating_add(ttl_secs.saturating_mul(1000))
    }
}

impl ScriptContext for Session<'_> {
    fn get(&mut self, key: &str) -> Option<String> {
        self.live(key).map(|entry| entry.value.clone())
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_ms: None,
            },
        );
    }

    fn incr(&mut self, key: &str) -> Result<i64> {
        match self.live(key) {
            Some(entry) => {
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| LeaseError::NotAnInteger(key.to_string()))?;
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| LeaseError::Store(format!("increment overflow at '{}'", key)))?;
                // TTL is kept across increments
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                self.set(key, "1".to_string());
                Ok(1)
            }
        }
    }

    fn expire(&mut self, key: &str, ttl_secs: u64) -> bool {
        let expires_at_ms = self.expiry_for(ttl_secs);
        match self.live(key) {
            Some(entry) => {
                entry.expires_at_ms = Some(expires_at_ms);
                true
            }
            None => false,
        }
    }

    fn ttl(&mut self, key: &str) -> Option<u64> {
        let now_ms = self.now_ms;
        self.live(key)
            .and_then(|entry| entry.expires_at_ms)
            .map(|at| (at.saturating_sub(now_ms) + 999) / 1000)
    }

    fn delete(&mut self, key: &str) -> u64 {
        match self.live(key) {
            Some(_) => {
                self.entries.remove(key);
                1
            }
            None => 0,
        }
    }
}
