//! # leasekv
//!
//! Distributed coordination on top of a shared, expiring key-value store:
//! - Lease-based mutual exclusion with stale-lease takeover
//! - Atomic fixed-window rate limiting via a server-side script
//! - A small TCP store server and client implementing the primitives both need
//!
//! ## Architecture Overview
//!
//! ```text
//!   ┌──────────────┐        ┌──────────────┐
//!   │ LockManager  │        │ RateLimiter  │
//!   └──────┬───────┘        └──────┬───────┘
//!          │   KeyValueStore trait  │
//!          └───────────┬────────────┘
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐   TCP   ┌──────────────┐
//!   │ MemoryStore │          │ RemoteStore │ ──────▶ │ Server       │
//!   │ (in-proc)   │          │ (per call)  │         │  └─ Engine   │
//!   └─────────────┘          └─────────────┘         │     └─ Memory│
//!                                                    └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use leasekv::{LockManager, MemoryStore, RateLimiter};
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let locks = LockManager::new(Arc::clone(&store));
//! if locks.acquire("report", 2000, 500) {
//!     // critical section
//!     locks.release("report");
//! }
//!
//! let limiter = RateLimiter::new(store).with_limit(10);
//! assert!(limiter.try_admit());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod store;
pub mod script;
pub mod lock;
pub mod limiter;

pub mod protocol;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LeaseError, Result};
pub use config::{Config, LimiterConfig, LockConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{KeyValueStore, MemoryStore, RemoteStore, Value};
pub use lock::{CancellationToken, Lease, LockManager};
pub use limiter::RateLimiter;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of leasekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
