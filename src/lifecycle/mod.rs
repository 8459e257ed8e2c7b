//! Process lifecycle subsystem.
//!
//! # Design Decisions
//! - Fail fast on startup: config or bind errors are fatal
//! - One shutdown coordinator shared by the server and background tasks

pub mod shutdown;

pub use shutdown::{wait_for_shutdown, Shutdown};
