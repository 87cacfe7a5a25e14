use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use super::node::NodeAddr;
use crate::error::{RouterError, RouterResult};

/// Liveness of one configured node at a given instant
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NodeHealth {
    pub address: NodeAddr,
    pub alive: bool,
    /// `None` if the node has never heartbeated
    pub last_seen_ms_ago: Option<u64>,
}

/// Last-heartbeat table for a fixed set of nodes.
///
/// The key set is decided at construction and never changes. `None` means
/// no heartbeat was ever received, which counts as dead.
pub struct HeartbeatTable {
    last_seen: RwLock<HashMap<NodeAddr, Option<Instant>>>,
}

impl HeartbeatTable {
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a NodeAddr>) -> Self {
        let last_seen = nodes.into_iter().map(|node| (node.clone(), None)).collect();
        Self {
            last_seen: RwLock::new(last_seen),
        }
    }

    pub fn record_heartbeat(&self, node: &NodeAddr, now: Instant) -> RouterResult<()> {
        let mut table = self.last_seen.write();
        match table.get_mut(node) {
            Some(slot) => {
                *slot = Some(now);
                Ok(())
            }
            None => Err(RouterError::UnknownDaemon(node.clone())),
        }
    }

    pub fn is_alive(&self, node: &NodeAddr, now: Instant, timeout: Duration) -> bool {
        let table = self.last_seen.read();
        table
            .get(node)
            .is_some_and(|seen| Self::fresh(*seen, now, timeout))
    }

    /// Every node alive at `now`.
    pub fn snapshot_live_set(&self, now: Instant, timeout: Duration) -> HashSet<NodeAddr> {
        let table = self.last_seen.read();
        table
            .iter()
            .filter(|(_, seen)| Self::fresh(**seen, now, timeout))
            .map(|(node, _)| node.clone())
            .collect()
    }

    /// Keep only the nodes alive at `now`, preserving order. Takes the
    /// shared lock once for the whole slice.
    pub fn retain_alive(&self, nodes: Vec<NodeAddr>, now: Instant, timeout: Duration) -> Vec<NodeAddr> {
        let table = self.last_seen.read();
        nodes
            .into_iter()
            .filter(|node| {
                let entry = table.get(node);
                debug_assert!(entry.is_some(), "node {} missing from heartbeat table", node);
                entry.is_some_and(|seen| Self::fresh(*seen, now, timeout))
            })
            .collect()
    }

    /// Health of each node in `order`, evaluated against one `now`.
    pub fn health(&self, order: &[NodeAddr], now: Instant, timeout: Duration) -> Vec<NodeHealth> {
        let table = self.last_seen.read();
        order
            .iter()
            .map(|node| {
                let seen = table.get(node).copied().flatten();
                NodeHealth {
                    address: node.clone(),
                    alive: Self::fresh(seen, now, timeout),
                    last_seen_ms_ago: seen
                        .map(|t| now.saturating_duration_since(t).as_millis() as u64),
                }
            })
            .collect()
    }

    fn fresh(seen: Option<Instant>, now: Instant, timeout: Duration) -> bool {
        match seen {
            Some(t) => now.saturating_duration_since(t) < timeout,
            None => false,
        }
    }
}

#[cfg(test)]
impl HeartbeatTable {
    fn len(&self) -> usize {
        self.last_seen.read().len()
    }

    fn contains(&self, node: &NodeAddr) -> bool {
        self.last_seen.read().contains_key(node)
    }

    fn last_seen(&self, node: &NodeAddr) -> Option<Instant> {
        self.last_seen.read().get(node).copied().flatten()
    }
}
