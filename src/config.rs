//! Configuration for leasekv
//!
//! Centralized configuration with sensible defaults: the TCP store server,
//! the lock manager, and the rate limiter each get their own struct.

use crate::error::{LeaseError, Result};

/// Server configuration for the networked store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds). Also bounds how long shutdown
    /// waits on an idle client, so it must be non-zero.
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Store Maintenance
    // -------------------------------------------------------------------------
    /// How often the server sweeps expired keys (milliseconds)
    pub purge_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:6379".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            purge_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.trim().is_empty() {
            return Err(LeaseError::Config("listen_addr is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(LeaseError::Config("max_connections must be at least 1".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(LeaseError::Config(
                "read_timeout_ms must be non-zero or idle clients block shutdown".to_string(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(LeaseError::Config("worker_threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the expired-key sweep interval (in milliseconds)
    pub fn purge_interval_ms(mut self, ms: u64) -> Self {
        self.config.purge_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Lock Configuration
// =============================================================================

/// Settings for [`crate::lock::LockManager`]
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Prefix joined to resource keys with `_` (`lock_<resource>`)
    pub namespace: String,

    /// Poll interval is `max_wait_ms / poll_divisor`
    pub poll_divisor: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            namespace: "lock".to_string(),
            poll_divisor: 10,
        }
    }
}

impl LockConfig {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn poll_divisor(mut self, divisor: u64) -> Self {
        self.poll_divisor = divisor.max(1);
        self
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Settings for [`crate::limiter::RateLimiter`]
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Window keys are `<namespace>:<unix second>`
    pub namespace: String,

    /// Max admissions per one-second window
    pub limit: u64,

    /// TTL given to a window key when it is first created (seconds)
    pub window_ttl_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            namespace: "ip".to_string(),
            limit: 10,
            window_ttl_secs: 2,
        }
    }
}

impl LimiterConfig {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn window_ttl_secs(mut self, secs: u64) -> Self {
        self.window_ttl_secs = secs.max(1);
        self
    }
}
