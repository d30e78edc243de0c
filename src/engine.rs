//! Engine Module
//!
//! Executes decoded commands against the server's store.
//!
//! ## Responsibilities
//! - Route each [`Command`] to the matching store primitive
//! - Resolve `EVAL` requests through the script registry
//! - Sweep expired keys on request from the server loop

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::protocol::Command;
use crate::script::ScriptRegistry;
use crate::store::{KeyValueStore, MemoryStore, Value};

/// The store behind a server
///
/// ## Concurrency Model
///
/// All state lives in one [`MemoryStore`], whose keyspace mutex serializes
/// every primitive and script. Connections share the engine through an
/// `Arc` and need no further coordination.
pub struct Engine {
    /// Keyspace
    store: Arc<MemoryStore>,

    /// Scripts clients may run by name
    scripts: ScriptRegistry,
}

impl Engine {
    /// Engine on the system clock with the built-in scripts
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Engine whose key expiry follows `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(MemoryStore::with_clock(clock)),
            scripts: ScriptRegistry::with_builtins(),
        }
    }

    /// Replace the script registry
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    /// Execute a command
    ///
    /// Booleans come back as `Int(0|1)`, absent values as `Nil`.
    pub fn execute(&self, command: Command) -> Result<Value> {
        let store = &self.store;
        let value = match command {
            Command::SetNx { key, value } => flag(store.set_if_absent(&key, &value)?),
            Command::SetNxEx {
                key,
                value,
                ttl_secs,
            } => flag(store.set_if_absent_ex(&key, &value, ttl_secs)?),
            Command::Get { key } => text(store.get(&key)?),
            Command::GetSet { key, value } => text(store.get_and_replace(&key, &value)?),
            Command::Incr { key } => Value::Int(store.incr(&key)?),
            Command::Expire { key, ttl_secs } => flag(store.expire(&key, ttl_secs)?),
            Command::Ttl { key } => match store.ttl(&key)? {
                Some(secs) => Value::Int(secs as i64),
                None => Value::Nil,
            },
            Command::Delete { key } => Value::Int(store.delete(&key)? as i64),
            Command::Eval { script, keys, args } => {
                let script = self.scripts.get(&script)?;
                store.run_script(script.as_ref(), &keys, &args)?
            }
            Command::Ping => Value::Text("PONG".to_string()),
        };
        Ok(value)
    }

    /// Drop expired keys; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Shared handle to the underlying store
    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// The scripts this engine can run
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn flag(b: bool) -> Value {
    Value::Int(i64::from(b))
}

fn text(value: Option<String>) -> Value {
    value.map_or(Value::Nil, Value::Text)
}
