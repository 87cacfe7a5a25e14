//! Rendezvous (highest random weight) replica selection

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::hasher::{Md5Hasher, NodeHasher};
use crate::cluster::node::{NodeAddr, RecordId};

struct ScoredNode<'a> {
    addr: &'a NodeAddr,
    score: u64,
}

/// Picks the nodes that should store a record.
///
/// Every candidate is scored with the configured [`NodeHasher`]; the
/// `replication_factor` highest scores win. Score ties are broken by the
/// larger address so the result is fully determined by (key, nodes, hasher).
#[derive(Clone)]
pub struct NodesFinder {
    hasher: Arc<dyn NodeHasher>,
    replication_factor: usize,
}

impl NodesFinder {
    pub fn new(hasher: Arc<dyn NodeHasher>, replication_factor: usize) -> Self {
        Self {
            hasher,
            replication_factor,
        }
    }

    /// Finder backed by a fresh [`Md5Hasher`]
    pub fn md5(replication_factor: usize) -> Self {
        Self::new(Arc::new(Md5Hasher::new()), replication_factor)
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Return at most `replication_factor` nodes from `nodes` that should
    /// hold `key`, best first. Fewer are returned only if `nodes` is shorter.
    pub fn find(&self, key: RecordId, nodes: &[NodeAddr]) -> Vec<NodeAddr> {
        let mut scored: Vec<ScoredNode<'_>> = nodes
            .iter()
            .map(|addr| ScoredNode {
                addr,
                score: self.hasher.hash(key, addr),
            })
            .collect();

        scored.sort_unstable_by(|a, b| match b.score.cmp(&a.score) {
            Ordering::Equal => b.addr.cmp(a.addr),
            other => other,
        });

        scored
            .into_iter()
            .take(self.replication_factor)
            .map(|s| s.addr.clone())
            .collect()
    }
}

impl fmt::Debug for NodesFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodesFinder")
            .field("replication_factor", &self.replication_factor)
            .finish_non_exhaustive()
    }
}
