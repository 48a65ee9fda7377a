//! Host specification
//!
//! A [`HostSpec`] is the validated, immutable description of one monitored
//! endpoint. It is built once at startup and handed to exactly one Seeker.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Url;

use crate::error::{Error, Result};

/// User-Agent sent when a host does not configure its own
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// HostSpec
// =============================================================================

/// Resolved configuration for one monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    /// Normalized absolute URL, also used as the metric `host` label
    url: Url,

    /// Per-request timeout
    timeout: Duration,

    /// Period between two checks
    interval: Duration,

    /// Headers injected on every request (always holds a User-Agent)
    headers: HeaderMap,
}

impl HostSpec {
    /// Create a host spec with the default User-Agent.
    ///
    /// Fails if the URL is not an absolute `http`/`https` URL, if either
    /// duration is zero, or if the interval is too large to schedule.
    pub fn new(raw_url: &str, timeout: Duration, interval: Duration) -> Result<Self> {
        let url = normalize_url(raw_url)?;

        if timeout.is_zero() {
            return Err(Error::InvalidHost {
                host: url.to_string(),
                reason: "timeout must be greater than zero".into(),
            });
        }
        if interval.is_zero() {
            return Err(Error::InvalidHost {
                host: url.to_string(),
                reason: "interval must be greater than zero".into(),
            });
        }
        if Instant::now().checked_add(interval).is_none() {
            return Err(Error::InvalidHost {
                host: url.to_string(),
                reason: format!("interval of {}s is too large to schedule", interval.as_secs()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Ok(Self {
            url,
            timeout,
            interval,
            headers,
        })
    }

    /// Set a header, replacing any value already stored under the same
    /// (case-insensitive) name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let (header_name, header_value) = self.parse_header(name, value)?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Set several headers at once.
    ///
    /// Fails if two entries name the same header, ignoring case.
    pub fn with_headers<'a, I>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut seen = HashSet::new();

        for (name, value) in headers {
            let (header_name, header_value) = self.parse_header(name, value)?;
            if !seen.insert(header_name.clone()) {
                return Err(Error::DuplicateHeader {
                    host: self.url.to_string(),
                    name: header_name.to_string(),
                });
            }
            self.headers.insert(header_name, header_value);
        }

        Ok(self)
    }

    fn parse_header(&self, name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
        let invalid = || Error::InvalidHeader {
            host: self.url.to_string(),
            name: name.to_string(),
        };

        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        Ok((header_name, header_value))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Label value identifying this host in metrics and logs
    pub fn label(&self) -> &str {
        self.url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Parse and normalize a host URL.
///
/// Only absolute `http` and `https` URLs are accepted.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidHost {
        host: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidHost {
            host: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
