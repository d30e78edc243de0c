//! Script registry
//!
//! Name → script lookup used by the server to resolve `EVAL` requests.

use std::collections::HashMap;
use std::sync::Arc;

use super::{CompareAndDeleteScript, FixedWindowScript, Script};
use crate::error::{LeaseError, Result};

/// Scripts the server is willing to run
#[derive(Default, Clone)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn Script>>,
}

impl ScriptRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in script
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FixedWindowScript));
        registry.register(Arc::new(CompareAndDeleteScript));
        registry
    }

    /// Add or replace a script under its own name
    pub fn register(&mut self, script: Arc<dyn Script>) {
        self.scripts.insert(script.name().to_string(), script);
    }

    /// Look up a script by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Script>> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| LeaseError::UnknownScript(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
