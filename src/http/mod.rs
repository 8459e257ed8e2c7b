//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, pipeline orchestration)
//!     → request.rs (request ID attachment)
//!     → [proxy subsystem validates, filters, forwards]
//!     → response.rs (assemble relayed response, cache marker)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use response::{CacheStatus, X_PROXY_CACHE};
pub use server::HttpServer;
