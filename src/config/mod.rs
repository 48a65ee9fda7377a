//! Configuration
//!
//! Resolves the set of hosts to check from the command line, the environment
//! and an optional configuration file.

mod file;
mod host;
mod resolver;

pub use file::{ConfigFile, HostEntry, CONFIG_FILE_NAME};
pub use host::{normalize_url, HostSpec, DEFAULT_USER_AGENT};
pub use resolver::{merge_hosts, parse_env_hosts, parse_file_hosts, resolve, CheckDefaults};
