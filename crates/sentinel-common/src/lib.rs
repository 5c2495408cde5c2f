//! Common infrastructure for Sentinel host-security daemons.
//!
//! This crate provides the shared plumbing used by the probe daemons:
//!
//! - [`cmd`]: external collector execution with captured output
//! - [`error`]: error types for probe infrastructure
//! - [`logging`]: tracing subscriber bootstrap
//!
//! # Architecture
//!
//! Sentinel probes follow this pattern:
//!
//! 1. Run a collector utility (`ausearch`) over the host's audit trail
//! 2. Parse and correlate the emitted records into a summary
//! 3. Compare the summary against a persisted behavioral baseline
//! 4. Hand the annotated summary to an external reporter

pub mod cmd;
pub mod error;
pub mod logging;

// Re-export commonly used items at crate root
pub use cmd::{run_capture, ExecResult, AUSEARCH_CMD};
pub use error::{SentinelError, SentinelResult};
