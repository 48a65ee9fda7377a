//! Host resolution
//!
//! Turns the raw host lists from the command line and the configuration file
//! into a deduplicated list of [`HostSpec`]s. Entries that fail validation are
//! logged and skipped; the configuration file wins when both sources name the
//! same normalized URL.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::file::ConfigFile;
use super::host::HostSpec;
use crate::error::{Error, Result};

/// Values applied to hosts that do not set their own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDefaults {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for CheckDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interval: Duration::from_secs(5),
        }
    }
}

/// Parse hosts given on the command line or through `HOSTS`
pub fn parse_env_hosts(entries: &[String], defaults: &CheckDefaults) -> Vec<HostSpec> {
    let entries: Vec<&str> = entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .collect();

    if entries.is_empty() {
        warn!("No hosts found in environment variable");
        return Vec::new();
    }

    let hosts: Vec<HostSpec> = entries
        .into_iter()
        .filter_map(
            |entry| match HostSpec::new(entry, defaults.timeout, defaults.interval) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    error!("Failed to parse host entry [{}] from environment: {}", entry, e);
                    None
                }
            },
        )
        .collect();

    info!("Parsed [{}] hosts from the environment", hosts.len());
    hosts
}

/// Parse hosts from the configuration file, filling gaps from `defaults`
pub fn parse_file_hosts(config: &ConfigFile, defaults: &CheckDefaults) -> Vec<HostSpec> {
    let mut hosts = Vec::with_capacity(config.hosts.len());

    for (name, entry) in &config.hosts {
        debug!("Found potential host [{}] ({}) in configuration file", entry.host, name);

        let timeout = entry
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let interval = entry
            .interval
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);

        let spec = HostSpec::new(&entry.host, timeout, interval)
            .and_then(|spec| spec.with_headers(&entry.headers));

        match spec {
            Ok(spec) => hosts.push(spec),
            Err(e) => error!(
                "Failed to parse host entry [{}] from configuration file: {}",
                entry.host, e
            ),
        }
    }

    info!("Parsed [{}] hosts from the configuration file", hosts.len());
    hosts
}

/// Merge both sources, keyed by normalized URL, configuration file first.
///
/// The result is ordered by URL.
pub fn merge_hosts(env_hosts: Vec<HostSpec>, file_hosts: Vec<HostSpec>) -> Vec<HostSpec> {
    let mut merged: BTreeMap<String, HostSpec> = BTreeMap::new();

    for spec in env_hosts.into_iter().chain(file_hosts) {
        merged.insert(spec.label().to_string(), spec);
    }

    merged.into_values().collect()
}

/// Resolve the full host list, failing when nothing is left to check
pub fn resolve(
    entries: &[String],
    config: Option<&ConfigFile>,
    defaults: &CheckDefaults,
) -> Result<Vec<HostSpec>> {
    let env_hosts = parse_env_hosts(entries, defaults);
    let file_hosts = config
        .map(|config| parse_file_hosts(config, defaults))
        .unwrap_or_default();

    let hosts = merge_hosts(env_hosts, file_hosts);
    if hosts.is_empty() {
        return Err(Error::NoHosts);
    }

    Ok(hosts)
}
