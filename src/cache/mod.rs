//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! GET request:
//!     → response_cache.rs get(url)  (hit → respond immediately)
//!     → miss: forward upstream, buffer body
//!     → 2xx: response_cache.rs set(url, status, headers, body)
//!
//! Background:
//!     sweep task evicts expired entries on an interval
//! ```
//!
//! # Design Decisions
//! - TTL-only eviction; an optional capacity bound guards against
//!   high-cardinality target URLs
//! - Cache lives for the process lifetime, constructed at startup and
//!   passed by handle into the handler; no global state, no persistence

pub mod response_cache;

pub use response_cache::{CacheEntry, ResponseCache};
