use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::node::NodeAddr;
use crate::error::{RouterError, RouterResult};

/// Number of nodes a key maps to.
pub const DEFAULT_REPLICATION_FACTOR: usize = 3;

/// Live replicas required before a lookup is answered.
pub const DEFAULT_MIN_REDUNDANCY: usize = 2;

pub const DEFAULT_FORGET_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:6745";

/// Configuration for a router instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Address the HTTP surface listens on (host:port)
    pub listen_addr: String,

    /// Daemons served by this router. Fixed for the router's lifetime.
    pub nodes: Vec<NodeAddr>,

    /// A node that has not heartbeated within this window is considered dead
    pub forget_timeout_ms: u64,

    pub replication_factor: usize,

    pub min_redundancy: usize,
}

impl RouterConfig {
    /// `forget_timeout` is stored in whole milliseconds, rounded up so a
    /// non-zero sub-millisecond timeout stays non-zero.
    pub fn new(nodes: Vec<NodeAddr>, forget_timeout: Duration) -> Self {
        Self {
            nodes,
            forget_timeout_ms: forget_timeout.as_nanos().div_ceil(1_000_000) as u64,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> RouterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded router config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> RouterResult<Self> {
        toml::from_str(content).map_err(|e| RouterError::InvalidConfig(e.to_string()))
    }

    pub fn forget_timeout(&self) -> Duration {
        Duration::from_millis(self.forget_timeout_ms)
    }

    /// Check the settings that do not depend on node count.
    pub fn validate(&self) -> RouterResult<()> {
        if self.replication_factor == 0 {
            return Err(RouterError::InvalidConfig(
                "replication_factor must be at least 1".to_string(),
            ));
        }
        if self.min_redundancy == 0 || self.min_redundancy > self.replication_factor {
            return Err(RouterError::InvalidConfig(format!(
                "min_redundancy must be in 1..={}, got {}",
                self.replication_factor, self.min_redundancy
            )));
        }
        if self.forget_timeout_ms == 0 {
            return Err(RouterError::InvalidConfig(
                "forget_timeout_ms must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node) {
                return Err(RouterError::InvalidConfig(format!(
                    "duplicate node '{}'",
                    node
                )));
            }
        }

        Ok(())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            nodes: Vec::new(),
            forget_timeout_ms: DEFAULT_FORGET_TIMEOUT_MS,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            min_redundancy: DEFAULT_MIN_REDUNDANCY,
        }
    }
}
