//! Fixed-window rate limiter

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;
use crate::script::FixedWindowScript;
use crate::store::{KeyValueStore, Value};

/// At most `limit` admissions per one-second window, across all callers
pub struct RateLimiter<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: LimiterConfig,
}

impl<S: KeyValueStore + ?Sized> RateLimiter<S> {
    /// Limiter on the system clock with default settings (10 per second)
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config: LimiterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LimiterConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for changing only the limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.config.limit = limit;
        self
    }

    pub fn limit(&self) -> u64 {
        self.config.limit
    }

    /// Counter key for the window containing `now_ms`
    pub fn window_key(&self, now_ms: u64) -> String {
        format!("{}:{}", self.config.namespace, now_ms / 1000)
    }

    /// Count this call against the current window; true if it fits
    ///
    /// Any store or script failure rejects.
    pub fn try_admit(&self) -> bool {
        let key = self.window_key(self.clock.now_millis());
        let keys = [key];
        let args = [
            self.config.limit.to_string(),
            self.config.window_ttl_secs.to_string(),
        ];

        match self.store.run_script(&FixedWindowScript, &keys, &args) {
            Ok(Value::Int(1)) => true,
            Ok(other) => {
                tracing::debug!(key = %keys[0], reply = ?other, "rate limited");
                false
            }
            Err(e) => {
                tracing::error!(key = %keys[0], error = %e, "rate limiter script failed");
                false
            }
        }
    }
}
