//! Lease handle and cancellation token

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A lease won by [`super::LockManager::try_acquire_lease`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// Resource name the caller asked for
    pub resource: String,

    /// Namespaced key in the store
    pub store_key: String,

    /// Value written to the store (`<expiry>:<holder id>`); compared on
    /// owned release
    pub token: String,

    /// Absolute expiry (unix millis), the prefix of `token`
    pub expires_at_ms: u64,
}

impl Lease {
    /// True once the lease's own expiry has passed
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms < now_ms
    }
}

/// Stops an in-flight `acquire_cancellable` at its next poll
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
