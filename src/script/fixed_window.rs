//! Fixed-window admission script
//!
//! `KEYS[1]` is the window counter, `ARGV[1]` the limit, `ARGV[2]` an optional
//! TTL in seconds for a freshly created window (default 2). Returns `1` when
//! the increment keeps the count within the limit, `0` otherwise.

use super::{int_arg, key_at, Script, ScriptContext};
use crate::error::{LeaseError, Result};
use crate::store::Value;

/// Increment-expire-compare in one atomic step
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedWindowScript;

impl FixedWindowScript {
    pub const NAME: &'static str = "fixed_window_limit";
    pub const DEFAULT_WINDOW_TTL_SECS: u64 = 2;
}

impl Script for FixedWindowScript {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, ctx: &mut dyn ScriptContext, keys: &[String], args: &[String]) -> Result<Value> {
        let key = key_at(Self::NAME, keys, 0)?;
        let limit = int_arg(Self::NAME, args, 0)?
            .ok_or_else(|| LeaseError::Script(format!("{}: missing limit", Self::NAME)))?;
        let ttl_secs = int_arg(Self::NAME, args, 1)?.unwrap_or(Self::DEFAULT_WINDOW_TTL_SECS);

        let count = ctx.incr(key)?;
        if count == 1 {
            ctx.expire(key, ttl_secs);
        }

        let admitted = u64::try_from(count).map_or(false, |c| c <= limit);
        Ok(Value::Int(i64::from(admitted)))
    }
}
