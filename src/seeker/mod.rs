//! Seeker
//!
//! One Seeker watches one host. It owns a [`Probe`], the host's gauges and the
//! up/down state, and runs its own ticker-driven loop until shutdown.
//!
//! ```text
//!   tick ──▶ probe ──▶ gauges ──▶ state tracker ──▶ transition log
//!    ▲                                                  │
//!    └──────────────────── next tick ◀──────────────────┘
//! ```

mod metrics;
mod state;

pub use metrics::{SeekerMetrics, HOST_LABEL, LATENCY_METRIC, STATUS_CODE_METRIC, UP_METRIC};
pub use state::{HostState, StateTracker, Transition};

use std::time::Duration;

use prometheus::Registry;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::HostSpec;
use crate::error::Result;
use crate::probe::{CheckOutcome, HttpTransport, Probe, Transport};

/// Periodic checker for a single host
pub struct Seeker<T = HttpTransport> {
    host: String,
    interval: Duration,
    probe: Probe<T>,
    metrics: SeekerMetrics,
    tracker: StateTracker,
}

impl Seeker<HttpTransport> {
    /// Build the client and register the gauges for `spec`.
    ///
    /// Performs no network I/O. Fails if the host's gauges are already
    /// registered or the client cannot be built.
    pub fn new(spec: &HostSpec, registry: &Registry) -> Result<Self> {
        let probe = Probe::new(spec)?;
        Self::with_probe(spec, probe, registry)
    }
}

impl<T: Transport> Seeker<T> {
    /// Build a seeker around an existing probe
    pub fn with_probe(spec: &HostSpec, probe: Probe<T>, registry: &Registry) -> Result<Self> {
        let metrics = SeekerMetrics::register(registry, spec.label())?;

        Ok(Self {
            host: spec.label().to_string(),
            interval: spec.interval(),
            probe,
            metrics,
            tracker: StateTracker::new(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn metrics(&self) -> &SeekerMetrics {
        &self.metrics
    }

    /// State after the last completed check
    pub fn state(&self) -> HostState {
        self.tracker.state()
    }

    /// Run one check, update the gauges and report any transition
    #[instrument(skip(self), fields(host = %self.host))]
    pub async fn check(&mut self) -> Option<Transition> {
        debug!("Checking [{}]", self.host);
        let outcome = self.probe.probe().await;

        match &outcome {
            CheckOutcome::TransportError(e) => {
                debug!("Got error [{}] for [{}]. Counting as down.", e, self.host);
            }
            CheckOutcome::HttpResult { status, latency } if status.is_success() => {
                debug!(
                    "Got status code [{}] for [{}] in {:?}. Counting as up.",
                    status.as_u16(),
                    self.host,
                    latency
                );
            }
            CheckOutcome::HttpResult { status, .. } => {
                debug!(
                    "Got status code [{}] for [{}]. Counting as down.",
                    status.as_u16(),
                    self.host
                );
            }
        }

        self.metrics.apply(&outcome);

        let transition = self.tracker.record(outcome.is_up());
        match transition {
            Some(Transition::WentDown) => match outcome.status() {
                Some(status) => warn!(
                    "Host [{}] is down (status code {}).",
                    self.host,
                    status.as_u16()
                ),
                None => warn!("Host [{}] is down (unreachable).", self.host),
            },
            Some(Transition::CameUp) => info!("Host [{}] is online.", self.host),
            None => {}
        }

        transition
    }

    /// Check on every tick until `shutdown` fires.
    ///
    /// A check in progress when shutdown fires is allowed to finish. Ticks
    /// missed while a check overruns are dropped, not replayed.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let start = Instant::now()
            .checked_add(self.interval)
            .unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Started checking [{}] every {:?}", self.host, self.interval);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.check().await;
        }

        info!("Received shutdown signal. Stopping seeker for [{}].", self.host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::{Request, Response, Url};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers with a scripted list of status codes, then 200
    struct Scripted(Mutex<VecDeque<u16>>);

    impl Scripted {
        fn new(codes: &[u16]) -> Self {
            Self(Mutex::new(codes.iter().copied().collect()))
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(
            &self,
            _request: Request,
        ) -> std::result::Result<Response, reqwest::Error> {
            let code = self.0.lock().unwrap().pop_front().unwrap_or(200);
            let response = hyper::Response::builder().status(code).body("").unwrap();
            Ok(Response::from(response))
        }
    }

    fn spec() -> HostSpec {
        HostSpec::new(
            "http://scripted.example/",
            Duration::from_secs(1),
            Duration::from_millis(20),
        )
        .unwrap()
    }

    fn seeker(codes: &[u16], registry: &Registry) -> Seeker<Scripted> {
        let spec = spec();
        let url: Url = spec.url().clone();
        Seeker::with_probe(&spec, Probe::with_transport(url, Scripted::new(codes)), registry)
            .unwrap()
    }

    #[tokio::test]
    async fn test_transitions_logged_once_per_flip() {
        let registry = Registry::new();
        let mut seeker = seeker(&[200, 200, 500, 500, 200], &registry);

        let mut transitions = Vec::new();
        for _ in 0..5 {
            if let Some(t) = seeker.check().await {
                transitions.push(t);
            }
        }

        assert_eq!(transitions, vec![Transition::WentDown, Transition::CameUp]);
        assert_eq!(seeker.state(), HostState::Up);
    }

    #[tokio::test]
    async fn test_first_check_down_is_transition() {
        let registry = Registry::new();
        let mut seeker = seeker(&[404], &registry);

        assert_eq!(seeker.check().await, Some(Transition::WentDown));
        assert_eq!(seeker.metrics().up(), 0.0);
        assert_eq!(seeker.metrics().status_code(), 404.0);
        assert_eq!(seeker.metrics().latency_ms(), 0.0);
    }

    #[tokio::test]
    async fn test_duplicate_host_fails_construction() {
        let registry = Registry::new();
        let _first = seeker(&[], &registry);

        let spec = spec();
        let second = Seeker::with_probe(
            &spec,
            Probe::with_transport(spec.url().clone(), Scripted::new(&[])),
            &registry,
        );

        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let registry = Registry::new();
        let seeker = seeker(&[], &registry);
        let metrics = seeker.metrics().clone();
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(seeker.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(110)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("seeker did not stop")
            .unwrap();
        assert_eq!(metrics.up(), 1.0);
    }

    #[tokio::test]
    async fn test_run_with_cancelled_token_never_checks() {
        let registry = Registry::new();
        let seeker = seeker(&[], &registry);
        let metrics = seeker.metrics().clone();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        seeker.run(shutdown).await;

        assert_eq!(metrics.status_code(), 0.0);
    }
}
