//! File-backed replica lookup.
//!
//! The daemon carries no in-process cluster client; desired replica
//! counts are published to a TOML file by an external agent and
//! re-read on every point lookup:
//!
//! ```toml
//! [workloads."default/api"]
//! replicas = 0
//!
//! [workloads."prod/worker"]
//! # replicas omitted → desired count unspecified
//! ```
//!
//! A missing or unreadable file is a transient lookup failure (the
//! tracker keeps its previous observations); a workload absent from
//! the file reports an unspecified desired count.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use snooze_core::WatchRef;
use snooze_tracker::{LookupError, ReplicaLookup};

#[derive(Debug, Deserialize)]
struct ReplicaFile {
    #[serde(default)]
    workloads: HashMap<String, WorkloadEntry>,
}

#[derive(Debug, Deserialize)]
struct WorkloadEntry {
    replicas: Option<u32>,
}

/// `ReplicaLookup` backed by a TOML file on disk.
pub struct SpecFileLookup {
    path: PathBuf,
}

impl SpecFileLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReplicaLookup for SpecFileLookup {
    async fn desired_replicas(&self, watch: &WatchRef) -> Result<Option<u32>, LookupError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LookupError::NotFound(watch.clone())
            } else {
                LookupError::Fetch {
                    watch: watch.clone(),
                    reason: format!("{}: {e}", self.path.display()),
                }
            }
        })?;

        let file: ReplicaFile =
            toml::from_str(&content).map_err(|e| LookupError::Fetch {
                watch: watch.clone(),
                reason: e.to_string(),
            })?;

        Ok(file
            .workloads
            .get(&watch.to_string())
            .and_then(|entry| entry.replicas))
    }
}
