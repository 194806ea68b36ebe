//! Unified logging for Vertex Swarm.
//!
//! [`LogArgs`] is the user-facing configuration, embeddable in any clap
//! parser and loadable from a config file. [`init_logging`] installs the
//! global `tracing` subscriber once at startup.

mod args;
mod logging;

pub use args::LogArgs;
pub use logging::{build_filter, init_logging};
