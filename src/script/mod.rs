//! Script Module
//!
//! Server-side atomic scripts.
//!
//! A script sees the keyspace only through [`ScriptContext`], and the store
//! runs it with exclusive access, so a read-modify-write sequence inside a
//! script cannot interleave with any other client. Over the network a script
//! is referenced by its registered name, and the server resolves it through
//! a [`ScriptRegistry`].
//!
//! ## Built-in Scripts
//! - `fixed_window_limit`: increment a window counter and compare to a limit
//! - `compare_and_delete`: delete a key only if it still holds a given token

mod compare_delete;
mod fixed_window;
mod registry;

pub use compare_delete::CompareAndDeleteScript;
pub use fixed_window::FixedWindowScript;
pub use registry::ScriptRegistry;

use crate::error::{LeaseError, Result};
use crate::store::Value;

/// Keyspace operations available to a running script
pub trait ScriptContext {
    fn get(&mut self, key: &str) -> Option<String>;

    /// Overwrite the value, clearing any TTL
    fn set(&mut self, key: &str, value: String);

    fn incr(&mut self, key: &str) -> Result<i64>;

    fn expire(&mut self, key: &str, ttl_secs: u64) -> bool;

    fn ttl(&mut self, key: &str) -> Option<u64>;

    fn delete(&mut self, key: &str) -> u64;
}

/// An atomic server-side script
pub trait Script: Send + Sync {
    /// Name the script is registered under on the server
    fn name(&self) -> &str;

    /// Execute against the locked keyspace
    fn run(&self, ctx: &mut dyn ScriptContext, keys: &[String], args: &[String]) -> Result<Value>;
}

/// `keys[index]`, or a script error naming what is missing
pub(crate) fn key_at<'a>(script: &str, keys: &'a [String], index: usize) -> Result<&'a str> {
    keys.get(index)
        .map(String::as_str)
        .ok_or_else(|| LeaseError::Script(format!("{}: missing key #{}", script, index + 1)))
}

/// `args[index]` parsed as an unsigned integer
pub(crate) fn int_arg(script: &str, args: &[String], index: usize) -> Result<Option<u64>> {
    match args.get(index) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            LeaseError::Script(format!(
                "{}: argument #{} is not an integer: '{}'",
                script,
                index + 1,
                raw
            ))
        }),
    }
}
