//! Store Module
//!
//! The key-value primitives the lock manager and rate limiter are built on.
//!
//! ## Implementations
//! - [`MemoryStore`]: in-process map with per-key expiry; also backs the server
//! - [`RemoteStore`]: the same primitives over TCP, one connection per call
//!
//! Every primitive is atomic on its own. Anything that needs several steps
//! to happen without interleaving goes through [`KeyValueStore::run_script`].

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::script::Script;

/// Result of a primitive or a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// No value (absent key, or a script returning nothing)
    Nil,

    /// Integer reply
    Int(i64),

    /// String reply
    Text(String),
}

impl Value {
    /// Integer view; `Nil` and text are `None`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

/// Shared, expiring key-value store
pub trait KeyValueStore: Send + Sync {
    /// Set `key` only if it holds no live value. True iff it was set.
    fn set_if_absent(&self, key: &str, value: &str) -> Result<bool>;

    /// `set_if_absent` plus a TTL in one atomic step
    fn set_if_absent_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool>;

    /// Current live value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Atomically replace the value, returning the previous one. Clears any TTL.
    fn get_and_replace(&self, key: &str, value: &str) -> Result<Option<String>>;

    /// Increment an integer value; an absent key counts as 0
    fn incr(&self, key: &str) -> Result<i64>;

    /// Set a TTL in seconds. True iff the key existed.
    fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// Remaining TTL in seconds; `None` if absent or without expiry
    fn ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Remove `key`, returning how many keys were removed (0 or 1)
    fn delete(&self, key: &str) -> Result<u64>;

    /// Run `script` atomically against `keys` with `args`
    fn run_script(&self, script: &dyn Script, keys: &[String], args: &[String]) -> Result<Value>;
}
