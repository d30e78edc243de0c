//! Compare-and-delete script
//!
//! `KEYS[1]` is the key, `ARGV[1]` the expected value. Deletes the key only
//! while it still holds that value. Returns the number of keys removed.

use super::{key_at, Script, ScriptContext};
use crate::error::{LeaseError, Result};
use crate::store::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct CompareAndDeleteScript;

impl CompareAndDeleteScript {
    pub const NAME: &'static str = "compare_and_delete";
}

impl Script for CompareAndDeleteScript {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, ctx: &mut dyn ScriptContext, keys: &[String], args: &[String]) -> Result<Value> {
        let key = key_at(Self::NAME, keys, 0)?;
        let expected = args
            .first()
            .ok_or_else(|| LeaseError::Script(format!("{}: missing expected value", Self::NAME)))?;

        let removed = match ctx.get(key) {
            Some(current) if &current == expected => ctx.delete(key),
            _ => 0,
        };
        Ok(Value::Int(removed as i64))
    }
}
