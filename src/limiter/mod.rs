//! Limiter Module
//!
//! Fixed-window admission control shared by every caller of one store.
//!
//! Each wall-clock second gets its own counter key (`ip:<unix second>`). One
//! atomic script call per request increments the counter, gives a new key a
//! short TTL, and compares against the limit, so two callers can never both
//! take the last slot. Up to `2L` requests can pass across a window boundary.

mod fixed_window;

pub use fixed_window::RateLimiter;
