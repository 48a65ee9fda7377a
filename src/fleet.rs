//! Fleet - starts one Seeker per host and stops them together
//!
//! Hosts whose Seeker cannot be constructed are logged and skipped; the
//! others start regardless. Every Seeker listens on a child of the fleet's
//! cancellation token.

use prometheus::Registry;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::HostSpec;
use crate::seeker::Seeker;

/// The set of running Seekers
pub struct Fleet {
    tasks: JoinSet<()>,
    hosts: Vec<String>,
    shutdown: CancellationToken,
}

impl Fleet {
    /// Construct and spawn a Seeker for each host.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(specs: &[HostSpec], registry: &Registry, shutdown: CancellationToken) -> Self {
        let mut tasks = JoinSet::new();
        let mut hosts = Vec::with_capacity(specs.len());

        for spec in specs {
            let seeker = match Seeker::new(spec, registry) {
                Ok(seeker) => seeker,
                Err(e) => {
                    error!("Failed to create seeker for [{}]: {}", spec.label(), e);
                    continue;
                }
            };

            tasks.spawn(seeker.run(shutdown.child_token()));
            hosts.push(spec.label().to_string());
        }

        info!("Started {} of {} seekers", hosts.len(), specs.len());

        Self {
            tasks,
            hosts,
            shutdown,
        }
    }

    /// Hosts with a running Seeker, in start order
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Signal every Seeker to stop and wait for all of them.
    ///
    /// Checks already in flight run to completion first.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();

        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!("Seeker task failed: {}", e);
            }
        }

        info!("All seekers stopped");
    }
}
