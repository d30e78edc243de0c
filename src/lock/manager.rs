//! Lock manager
//!
//! Poll-and-sleep acquisition loop plus release.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::{CancellationToken, Lease};
use crate::clock::{Clock, SystemClock};
use crate::config::LockConfig;
use crate::error::{LeaseError, Result};
use crate::script::CompareAndDeleteScript;
use crate::store::{KeyValueStore, Value};

/// Distributed lock over a shared store
///
/// Holds no in-process state about who owns what: every decision is made by
/// the store, so managers in different processes (or threads) pointing at the
/// same store exclude each other.
pub struct LockManager<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: LockConfig,
}

impl<S: KeyValueStore + ?Sized> LockManager<S> {
    /// Manager on the system clock with default settings
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Manager whose timestamps and sleeps go through `clock`
    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config: LockConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LockConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Store key guarding `resource`
    pub fn store_key(&self, resource: &str) -> String {
        format!("{}_{}", self.config.namespace, resource)
    }

    /// Try to take the lock on `resource` for `lock_duration_ms`, waiting up
    /// to `max_wait_ms`
    ///
    /// Returns `false` on timeout and on any store failure; the caller must
    /// not enter the critical section then.
    pub fn acquire(&self, resource: &str, lock_duration_ms: u64, max_wait_ms: u64) -> bool {
        self.acquire_inner(resource, lock_duration_ms, max_wait_ms, None)
            .is_some()
    }

    /// [`acquire`](Self::acquire) that also stops once `cancel` fires
    pub fn acquire_cancellable(
        &self,
        resource: &str,
        lock_duration_ms: u64,
        max_wait_ms: u64,
        cancel: &CancellationToken,
    ) -> bool {
        self.acquire_inner(resource, lock_duration_ms, max_wait_ms, Some(cancel))
            .is_some()
    }

    /// Same loop as [`acquire`](Self::acquire), returning the lease written
    /// to the store so it can be released with [`release_lease`](Self::release_lease)
    pub fn try_acquire_lease(
        &self,
        resource: &str,
        lock_duration_ms: u64,
        max_wait_ms: u64,
    ) -> Option<Lease> {
        self.acquire_inner(resource, lock_duration_ms, max_wait_ms, None)
    }

    /// Delete the lease on `resource`, whoever holds it
    ///
    /// Best effort: a missing key (already expired or taken over) is logged,
    /// never reported.
    pub fn release(&self, resource: &str) {
        let key = self.store_key(resource);
        match self.store.delete(&key) {
            Ok(1) => tracing::info!(key = %key, "release lock success"),
            Ok(_) => tracing::info!(key = %key, "release lock failed: lease no longer present"),
            Err(e) => tracing::error!(key = %key, error = %e, "release lock failed: store error"),
        }
    }

    /// Delete the lease only if the store still holds `lease.token`
    ///
    /// Unlike [`release`](Self::release) this never removes a lease written
    /// by another acquisition. It can also refuse to delete the caller's own
    /// lease: when two callers race to take over the same stale lease, the
    /// loser's replace overwrites the winner's token, and the winner's lease
    /// is then left to expire on its TTL. Returns true iff it deleted.
    pub fn release_lease(&self, lease: &Lease) -> bool {
        let keys = [lease.store_key.clone()];
        let args = [lease.token.clone()];
        match self.store.run_script(&CompareAndDeleteScript, &keys, &args) {
            Ok(Value::Int(1)) => {
                tracing::info!(key = %lease.store_key, "release lease success");
                true
            }
            Ok(_) => {
                tracing::info!(key = %lease.store_key, "release lease failed: not the current holder");
                false
            }
            Err(e) => {
                tracing::error!(key = %lease.store_key, error = %e, "release lease failed: store error");
                false
            }
        }
    }

    fn acquire_inner(
        &self,
        resource: &str,
        lock_duration_ms: u64,
        max_wait_ms: u64,
        cancel: Option<&CancellationToken>,
    ) -> Option<Lease> {
        let store_key = self.store_key(resource);

        match self.poll_for_lease(&store_key, lock_duration_ms, max_wait_ms, cancel) {
            Ok(Some((expires_at_ms, token))) => {
                self.arm_safety_ttl(&store_key, lock_duration_ms);
                tracing::info!(key = %store_key, expires_at_ms, "lock acquired");
                Some(Lease {
                    resource: resource.to_string(),
                    token,
                    store_key,
                    expires_at_ms,
                })
            }
            Ok(None) => {
                tracing::debug!(key = %store_key, max_wait_ms, "lock not acquired");
                None
            }
            Err(e) => {
                tracing::error!(key = %store_key, error = %e, "lock failed: store error");
                None
            }
        }
    }

    /// The retry loop. `Ok(Some((expiry, token)))` when this caller now holds
    /// the lease.
    fn poll_for_lease(
        &self,
        store_key: &str,
        lock_duration_ms: u64,
        max_wait_ms: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<(u64, String)>> {
        let deadline = self.clock.now_millis().saturating_add(max_wait_ms);
        let poll = Duration::from_millis((max_wait_ms / self.config.poll_divisor.max(1)).max(1));

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::debug!(key = %store_key, "lock wait cancelled");
                return Ok(None);
            }

            let now = self.clock.now_millis();
            let expires_at_ms = now.saturating_add(lock_duration_ms);
            let token = lease_token(expires_at_ms);

            if self.store.set_if_absent(store_key, &token)? {
                return Ok(Some((expires_at_ms, token)));
            }

            // Absent here means the holder let go between the two calls:
            // go straight back to set_if_absent.
            if let Some(stored) = self.store.get(store_key)? {
                if parse_expiry(store_key, &stored)? < now {
                    let previous = self.store.get_and_replace(store_key, &token)?;
                    if previous.as_deref().map_or(true, |p| p == stored) {
                        tracing::info!(key = %store_key, stale = %stored, "took over stale lease");
                        return Ok(Some((expires_at_ms, token)));
                    }
                    tracing::debug!(key = %store_key, "lost stale lease takeover race");
                }
                self.clock.sleep(poll);
            }

            if self.clock.now_millis() > deadline {
                return Ok(None);
            }
        }
    }

    /// Give the lease key a TTL so a holder that dies right now can't keep it
    ///
    /// Rounded up to whole seconds: the key must outlive the expiry it stores.
    fn arm_safety_ttl(&self, store_key: &str, lock_duration_ms: u64) {
        let ttl_secs = lock_duration_ms.div_ceil(1000).max(1);
        match self.store.expire(store_key, ttl_secs) {
            Ok(true) => {}
            Ok(false) => tracing::warn!(key = %store_key, "lease vanished before its TTL was set"),
            Err(e) => tracing::error!(key = %store_key, error = %e, "setting lease TTL failed"),
        }
    }
}

/// Stored lease value: `<expiry ms>:<holder id>`
fn lease_token(expires_at_ms: u64) -> String {
    format!("{}:{}", expires_at_ms, Uuid::new_v4().simple())
}

/// Expiry prefix of a stored lease; a bare timestamp is accepted too
fn parse_expiry(store_key: &str, stored: &str) -> Result<u64> {
    let expiry = stored.split_once(':').map_or(stored, |(expiry, _)| expiry);
    expiry.trim().parse().map_err(|_| {
        LeaseError::Store(format!(
            "lease at '{}' is not a timestamp: '{}'",
            store_key, stored
        ))
    })
}
