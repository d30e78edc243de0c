//! Lock Module
//!
//! Lease-based distributed mutual exclusion over a [`KeyValueStore`].
//!
//! ## Lease Encoding
//! ```text
//!   key:   lock_<resource>
//!   value: "<expiry, unix millis>:<holder id>"
//!          e.g. "1760781234567:6f1c0e8a54b24c3f9d1e2a7b3c4d5e6f"
//!   ttl:   lock_duration_ms rounded up to whole seconds (at least 1 s)
//! ```
//!
//! The whole value is the holder's token. A reader that finds an
//! expiry in the past treats the lease as stale and may take it over with
//! get-and-replace; only the caller whose replace returns the exact stale
//! value it read wins.
//!
//! ## Guarantees
//! - At most one valid holder per resource under normal operation
//! - A crashed holder's lease becomes acquirable after `lock_duration_ms`
//! - `acquire` gives up after `max_wait_ms` (plus at most one poll interval)
//! - No fairness among waiters
//!
//! [`KeyValueStore`]: crate::store::KeyValueStore

mod lease;
mod manager;

pub use lease::{CancellationToken, Lease};
pub use manager::LockManager;
