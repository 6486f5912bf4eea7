//! # Observability Infrastructure
//!
//! Structured logging for the server. Spans come from `#[instrument]` on tool
//! executors and the per-request [`rpc_span!`](crate::rpc_span) macro.

pub mod logging;

pub use logging::{init_logging, log_config_info};
