//! Per-host gauges

use prometheus::{Gauge, Opts, Registry};

use crate::error::{Error, Result};
use crate::probe::CheckOutcome;

pub const UP_METRIC: &str = "uptime_up";
pub const LATENCY_METRIC: &str = "uptime_latency";
pub const STATUS_CODE_METRIC: &str = "uptime_status_code";

/// Label carrying the normalized host URL
pub const HOST_LABEL: &str = "host";

/// The three gauges describing one host
#[derive(Clone)]
pub struct SeekerMetrics {
    up: Gauge,
    latency: Gauge,
    status_code: Gauge,
}

impl SeekerMetrics {
    /// Create the gauges for `host` and register them.
    ///
    /// If any registration fails the gauges registered so far are removed
    /// again, leaving the registry as it was.
    pub fn register(registry: &Registry, host: &str) -> Result<Self> {
        let gauge = |name: &str, help: &str| {
            Gauge::with_opts(Opts::new(name, help).const_label(HOST_LABEL, host)).map_err(|e| {
                Error::MetricRegistration {
                    host: host.to_string(),
                    source: e,
                }
            })
        };

        let metrics = Self {
            up: gauge(UP_METRIC, "Whether the host is up or not.")?,
            latency: gauge(
                LATENCY_METRIC,
                "The latency in milliseconds between the server and the remote host.",
            )?,
            status_code: gauge(STATUS_CODE_METRIC, "The status code of the last request.")?,
        };

        let mut registered: Vec<&Gauge> = Vec::with_capacity(3);
        for gauge in [&metrics.up, &metrics.latency, &metrics.status_code] {
            if let Err(e) = registry.register(Box::new(gauge.clone())) {
                for done in registered {
                    let _ = registry.unregister(Box::new(done.clone()));
                }
                return Err(Error::MetricRegistration {
                    host: host.to_string(),
                    source: e,
                });
            }
            registered.push(gauge);
        }

        Ok(metrics)
    }

    /// Update the gauges from one check.
    ///
    /// Latency moves only on success; the status code moves on any response.
    /// A transport error only sets `up` to 0.
    pub fn apply(&self, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::TransportError(_) => {
                self.up.set(0.0);
            }
            CheckOutcome::HttpResult { status, latency } => {
                self.status_code.set(f64::from(status.as_u16()));
                if status.is_success() {
                    self.up.set(1.0);
                    self.latency.set(latency.as_secs_f64() * 1000.0);
                } else {
                    self.up.set(0.0);
                }
            }
        }
    }

    pub fn up(&self) -> f64 {
        self.up.get()
    }

    /// Last successful round-trip in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.get()
    }

    pub fn status_code(&self) -> f64 {
        self.status_code.get()
    }
}
