//! Liveness-aware replica routing

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::finder::NodesFinder;
use crate::cluster::config::RouterConfig;
use crate::cluster::health::{HeartbeatTable, NodeHealth};
use crate::cluster::node::{NodeAddr, RecordId};
use crate::error::{RouterError, RouterResult};

/// Routes record keys to live replica nodes.
///
/// The canonical replica set for a key is computed over the full configured
/// node list, so it never depends on heartbeat timing. Liveness is applied
/// afterwards as a filter, and a lookup is refused when fewer than
/// `min_redundancy` of the chosen replicas are alive.
pub struct ShardRouter {
    nodes: Vec<NodeAddr>,
    forget_timeout: Duration,
    min_redundancy: usize,
    finder: NodesFinder,
    heartbeats: HeartbeatTable,
}

impl ShardRouter {
    /// Build a router. Fails with `NotEnoughDaemons` if fewer nodes than the
    /// replication factor are configured. The finder must use the same
    /// replication factor as the config.
    pub fn new(config: RouterConfig, finder: NodesFinder) -> RouterResult<Self> {
        let replication_factor = finder.replication_factor();
        if config.replication_factor != replication_factor {
            return Err(RouterError::InvalidConfig(format!(
                "finder replication factor {} does not match configured replication_factor {}",
                replication_factor, config.replication_factor
            )));
        }
        if config.nodes.len() < replication_factor {
            return Err(RouterError::NotEnoughDaemons {
                required: replication_factor,
                available: config.nodes.len(),
            });
        }
        config.validate()?;

        let heartbeats = HeartbeatTable::new(&config.nodes);
        tracing::info!(
            "Router serving {} nodes (rf={}, min_redundancy={}, forget_timeout={:?})",
            config.nodes.len(),
            replication_factor,
            config.min_redundancy,
            config.forget_timeout()
        );

        Ok(Self {
            forget_timeout: config.forget_timeout(),
            min_redundancy: config.min_redundancy,
            nodes: config.nodes,
            finder,
            heartbeats,
        })
    }

    /// Router using MD5 scoring and the config's replication factor
    pub fn with_md5(config: RouterConfig) -> RouterResult<Self> {
        let finder = NodesFinder::md5(config.replication_factor);
        Self::new(config, finder)
    }

    /// Register a heartbeat from `node`. Unknown nodes are rejected and
    /// leave the table unchanged.
    pub fn heartbeat(&self, node: &NodeAddr) -> RouterResult<()> {
        match self.heartbeats.record_heartbeat(node, Instant::now()) {
            Ok(()) => {
                tracing::trace!("Heartbeat from {}", node);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Rejected heartbeat from unknown node {}", node);
                Err(e)
            }
        }
    }

    /// Live nodes that should hold `key`, in rank order.
    pub fn find_nodes(&self, key: RecordId) -> RouterResult<Vec<NodeAddr>> {
        let candidates = self.candidates(key);
        let now = Instant::now();
        let live = self.heartbeats.retain_alive(candidates, now, self.forget_timeout);

        if live.len() < self.min_redundancy {
            tracing::warn!(
                "Key {}: only {} of {} required replicas alive",
                key,
                live.len(),
                self.min_redundancy
            );
            return Err(RouterError::NotEnoughDaemons {
                required: self.min_redundancy,
                available: live.len(),
            });
        }

        Ok(live)
    }

    /// Canonical replica set for `key`, ignoring liveness
    pub fn candidates(&self, key: RecordId) -> Vec<NodeAddr> {
        self.finder.find(key, &self.nodes)
    }

    /// All configured nodes, alive or not
    pub fn list_nodes(&self) -> &[NodeAddr] {
        &self.nodes
    }

    pub fn live_nodes(&self) -> HashSet<NodeAddr> {
        self.heartbeats
            .snapshot_live_set(Instant::now(), self.forget_timeout)
    }

    /// Per-node liveness in configuration order
    pub fn node_statuses(&self) -> Vec<NodeHealth> {
        self.heartbeats
            .health(&self.nodes, Instant::now(), self.forget_timeout)
    }

    pub fn replication_factor(&self) -> usize {
        self.finder.replication_factor()
    }

    pub fn min_redundancy(&self) -> usize {
        self.min_redundancy
    }

    pub fn forget_timeout(&self) -> Duration {
        self.forget_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharding::hasher::FixedHasher;
    use std::sync::Arc;
    use std::thread;

    fn cluster(n: usize) -> Vec<NodeAddr> {
        (0..n).map(|i| NodeAddr::new(format!("node-{}:7000", i))).collect()
    }

    fn config(nodes: Vec<NodeAddr>) -> RouterConfig {
        RouterConfig::new(nodes, Duration::from_secs(5))
    }

    #[test]
    fn test_new_rejects_too_few_nodes() {
        let err = ShardRouter::with_md5(config(cluster(2))).err().unwrap();
        assert_eq!(
            err,
            RouterError::NotEnoughDaemons {
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_new_exactly_rf_nodes() {
        assert!(ShardRouter::with_md5(config(cluster(3))).is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut cfg = config(cluster(4));
        cfg.min_redundancy = 5;
        assert!(matches!(
            ShardRouter::with_md5(cfg),
            Err(RouterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_finder_with_smaller_rf() {
        let result = ShardRouter::new(config(cluster(5)), NodesFinder::md5(1));
        assert!(matches!(result, Err(RouterError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_finder_with_larger_config_rf() {
        let mut cfg = config(cluster(4));
        cfg.replication_factor = 5;
        let result = ShardRouter::new(cfg, NodesFinder::md5(3));
        assert!(matches!(result, Err(RouterError::InvalidConfig(_))));
    }

    #[test]
    fn test_matching_rf_serves_lookups_when_all_alive() {
        let nodes = cluster(5);
        let router = ShardRouter::new(config(nodes.clone()), NodesFinder::md5(3)).unwrap();
        for n in &nodes {
            router.heartbeat(n).unwrap();
        }
        assert_eq!(router.find_nodes(RecordId(1)).unwrap().len(), 3);
    }

    #[test]
    fn test_fresh_router_refuses_queries() {
        let router = ShardRouter::with_md5(config(cluster(5))).unwrap();
        assert_eq!(
            router.find_nodes(RecordId(1)).unwrap_err(),
            RouterError::NotEnoughDaemons {
                required: 2,
                available: 0
            }
        );
    }

    #[test]
    fn test_heartbeat_unknown_node() {
        let router = ShardRouter::with_md5(config(cluster(3))).unwrap();
        let stranger = NodeAddr::from("ghost:1");

        assert_eq!(
            router.heartbeat(&stranger),
            Err(RouterError::UnknownDaemon(stranger))
        );
        assert!(router.live_nodes().is_empty());
    }

    #[test]
    fn test_find_nodes_all_alive_matches_candidates() {
        let nodes = cluster(5);
        let router = ShardRouter::with_md5(config(nodes.clone())).unwrap();
        for n in &nodes {
            router.heartbeat(n).unwrap();
        }

        for key in 0..50u64 {
            let key = RecordId(key);
            assert_eq!(router.find_nodes(key).unwrap(), router.candidates(key));
        }
    }

    #[test]
    fn test_find_nodes_filters_dead_in_rank_order() {
        let nodes = cluster(5);
        let hasher = FixedHasher::new([
            (nodes[2].clone(), 50),
            (nodes[0].clone(), 40),
            (nodes[4].clone(), 30),
            (nodes[1].clone(), 20),
            (nodes[3].clone(), 10),
        ]);
        let router =
            ShardRouter::new(config(nodes.clone()), NodesFinder::new(Arc::new(hasher), 3)).unwrap();

        assert_eq!(
            router.candidates(RecordId(42)),
            vec![nodes[2].clone(), nodes[0].clone(), nodes[4].clone()]
        );

        router.heartbeat(&nodes[2]).unwrap();
        router.heartbeat(&nodes[0]).unwrap();
        // Alive but outside the replica set, must not be returned
        router.heartbeat(&nodes[1]).unwrap();

        assert_eq!(
            router.find_nodes(RecordId(42)).unwrap(),
            vec![nodes[2].clone(), nodes[0].clone()]
        );
    }

    #[test]
    fn test_find_nodes_below_min_redundancy() {
        let nodes = cluster(5);
        let hasher = FixedHasher::new([(nodes[2].clone(), 50), (nodes[0].clone(), 40), (nodes[4].clone(), 30)]);
        let router =
            ShardRouter::new(config(nodes.clone()), NodesFinder::new(Arc::new(hasher), 3)).unwrap();

        router.heartbeat(&nodes[2]).unwrap();

        assert_eq!(
            router.find_nodes(RecordId(42)).unwrap_err(),
            RouterError::NotEnoughDaemons {
                required: 2,
                available: 1
            }
        );
        // A failed lookup leaves state alone; it can be retried after more heartbeats
        router.heartbeat(&nodes[4]).unwrap();
        assert_eq!(
            router.find_nodes(RecordId(42)).unwrap(),
            vec![nodes[2].clone(), nodes[4].clone()]
        );
    }

    #[test]
    fn test_expired_heartbeat_excluded() {
        let nodes = cluster(3);
        let mut cfg = config(nodes.clone());
        cfg.forget_timeout_ms = 1;
        let router = ShardRouter::with_md5(cfg).unwrap();

        for n in &nodes {
            router.heartbeat(n).unwrap();
        }
        thread::sleep(Duration::from_millis(20));

        assert!(router.live_nodes().is_empty());
        assert!(router.find_nodes(RecordId(7)).is_err());
    }

    #[test]
    fn test_list_nodes_unfiltered() {
        let nodes = cluster(4);
        let router = ShardRouter::with_md5(config(nodes.clone())).unwrap();
        assert_eq!(router.list_nodes(), nodes.as_slice());
    }

    #[test]
    fn test_node_statuses() {
        let nodes = cluster(3);
        let router = ShardRouter::with_md5(config(nodes.clone())).unwrap();
        router.heartbeat(&nodes[1]).unwrap();

        let statuses = router.node_statuses();
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[1].address, nodes[1]);
        assert!(statuses[1].alive);
        assert!(!statuses[0].alive);
        assert_eq!(statuses[0].last_seen_ms_ago, None);
    }

    #[test]
    fn test_concurrent_heartbeats_and_lookups() {
        let nodes = cluster(6);
        let router = Arc::new(ShardRouter::with_md5(config(nodes.clone())).unwrap());
        for n in &nodes {
            router.heartbeat(n).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = Arc::clone(&router);
                let nodes = nodes.clone();
                thread::spawn(move || {
                    for key in 0..200u64 {
                        if i % 2 == 0 {
                            router.heartbeat(&nodes[(key as usize) % nodes.len()]).unwrap();
                        } else {
                            let found = router.find_nodes(RecordId(key)).unwrap();
                            assert_eq!(found, router.candidates(RecordId(key)));
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
