//! Uptime Seeker - Prometheus-compatible uptime checker
//!
//! Periodically probes a set of HTTP endpoints and exposes their liveness,
//! latency and last status code as Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! Config (hosts) → Fleet → Seeker per host → Probe → gauges ← Metrics Server
//! ```
//!
//! Each Seeker runs as its own task with its own HTTP client and cookie jar.
//! The only state shared between Seekers is the metrics registry.
//!
//! # Modules
//!
//! - [`config`] - Host resolution from CLI, environment and config file
//! - [`error`] - Error types
//! - [`exposition`] - `/metrics` HTTP endpoint
//! - [`fleet`] - Starting and stopping all Seekers
//! - [`probe`] - Single HTTP check with header injection and cookies
//! - [`seeker`] - Per-host check loop, gauges and up/down tracking
//! - [`shutdown`] - Signal handling

pub mod config;
pub mod error;
pub mod exposition;
pub mod fleet;
pub mod probe;
pub mod seeker;
pub mod shutdown;

// Re-export commonly used types
pub use config::{CheckDefaults, ConfigFile, HostSpec};
pub use error::{Error, Result};
pub use exposition::MetricsServer;
pub use fleet::Fleet;
pub use probe::{CheckOutcome, Probe};
pub use seeker::{HostState, Seeker, SeekerMetrics, Transition};
