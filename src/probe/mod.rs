//! Probe
//!
//! A [`Probe`] performs a single HTTP GET against one host and classifies the
//! result. Each probe owns its own client and cookie jar so that cookies set by
//! one host are replayed to that host only.

mod transport;

pub use transport::{HeaderInjector, Transport};

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::cookie::Jar;
use reqwest::{Client, Method, Request, StatusCode, Url};
use tracing::debug;

use crate::config::HostSpec;
use crate::error::{Error, Result};

// =============================================================================
// Check Outcome
// =============================================================================

/// Result of one probe attempt
#[derive(Debug)]
pub enum CheckOutcome {
    /// No response was received (DNS, connect, TLS, timeout, broken response)
    TransportError(reqwest::Error),

    /// A response was received
    HttpResult {
        status: StatusCode,
        /// Time from sending the request to receiving the response head
        latency: Duration,
    },
}

impl CheckOutcome {
    /// A check counts as up only for a 2xx response
    pub fn is_up(&self) -> bool {
        matches!(self, CheckOutcome::HttpResult { status, .. } if status.is_success())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CheckOutcome::HttpResult { status, .. } => Some(*status),
            CheckOutcome::TransportError(_) => None,
        }
    }

    pub fn latency(&self) -> Option<Duration> {
        match self {
            CheckOutcome::HttpResult { latency, .. } => Some(*latency),
            CheckOutcome::TransportError(_) => None,
        }
    }
}

// =============================================================================
// Probe
// =============================================================================

/// Client used for real hosts: header injection over a cookie-aware client
pub type HttpTransport = HeaderInjector<Client>;

/// Single-attempt HTTP check against one URL
pub struct Probe<T = HttpTransport> {
    url: Url,
    transport: T,
}

impl Probe<HttpTransport> {
    /// Build the dedicated client for a host.
    ///
    /// No network I/O happens here.
    pub fn new(spec: &HostSpec) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .timeout(spec.timeout())
            .cookie_provider(jar)
            .build()
            .map_err(|e| Error::HttpClient {
                host: spec.label().to_string(),
                source: e,
            })?;

        Ok(Self::with_transport(
            spec.url().clone(),
            HeaderInjector::new(spec.headers().clone(), client),
        ))
    }
}

impl<T: Transport> Probe<T> {
    /// Create a probe over any transport
    pub fn with_transport(url: Url, transport: T) -> Self {
        Self { url, transport }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one GET and classify the response.
    ///
    /// The response body is drained before returning so the connection can be
    /// reused by the next check.
    pub async fn probe(&self) -> CheckOutcome {
        let request = Request::new(Method::GET, self.url.clone());

        let start = Instant::now();
        let mut response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => return CheckOutcome::TransportError(e),
        };
        let latency = start.elapsed();
        let status = response.status();

        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    debug!("Failed to drain response body from [{}]: {}", self.url, e);
                    break;
                }
            }
        }

        CheckOutcome::HttpResult { status, latency }
    }
}
