//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-IP fixed window, 429 on deny)
//!     → Pass to the proxy handler
//! ```
//!
//! # Design Decisions
//! - The limiter gates the pipeline; the handler never sees denied requests
//! - Fail closed: an over-limit caller is rejected, not queued

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiterState};
