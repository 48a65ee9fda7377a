//! Configuration file
//!
//! Hosts may be described in a TOML or YAML file. Fields left out of an entry
//! fall back to the command line defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// File name looked up in each search directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Host entries keyed by a free-form name
    #[serde(default)]
    pub hosts: BTreeMap<String, HostEntry>,
}

/// One `[hosts.<name>]` table
#[derive(Debug, Clone, Deserialize)]
pub struct HostEntry {
    /// URL to check
    pub host: String,

    /// Timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Interval in seconds
    #[serde(default)]
    pub interval: Option<u64>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Load a configuration file, picking the format from its extension.
    ///
    /// `.yaml` and `.yml` are read as YAML, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        debug!(
            "Loaded {} host entries from {}",
            config.hosts.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Find the first existing `config.toml` in the search directories
    pub fn discover() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.is_file())
    }

    /// Candidate locations: `.`, `$HOME/.uptimer`, then `/app`
    pub fn search_paths() -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join(".uptimer"));
        }
        dirs.push(PathBuf::from("/app"));

        dirs.into_iter()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .collect()
    }
}
