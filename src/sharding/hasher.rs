//! Scoring functions for rendezvous selection

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::cluster::node::{NodeAddr, RecordId};

/// Number of scratch buffers the MD5 hasher keeps around.
pub const DEFAULT_POOL_SIZE: usize = 4096;

/// Computes the rendezvous score of `node` for `key`.
///
/// Implementations must be deterministic across calls, processes and runs.
pub trait NodeHasher: Send + Sync {
    fn hash(&self, key: RecordId, node: &NodeAddr) -> u64;
}

/// MD5 over `key bytes || address bytes`; the score is the first 8 digest
/// bytes read little-endian.
///
/// Scratch buffers are recycled through a bounded pool. The pool is best
/// effort only: a miss allocates and a full or contended pool drops the
/// buffer, so the score never depends on pool state.
pub struct Md5Hasher {
    pool: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl Md5Hasher {
    pub fn new() -> Self {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size(capacity: usize) -> Self {
        Self {
            pool: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Buffers currently parked in the pool
    pub fn pooled(&self) -> usize {
        self.pool.lock().len()
    }

    fn acquire(&self, size: usize) -> Vec<u8> {
        let mut buf = self
            .pool
            .try_lock()
            .and_then(|mut pool| pool.pop())
            .unwrap_or_default();
        buf.clear();
        buf.reserve(size);
        buf
    }

    fn release(&self, buf: Vec<u8>) {
        if let Some(mut pool) = self.pool.try_lock() {
            if pool.len() < self.capacity {
                pool.push(buf);
            }
        }
    }
}

impl Default for Md5Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeHasher for Md5Hasher {
    fn hash(&self, key: RecordId, node: &NodeAddr) -> u64 {
        let mut buf = self.acquire(RecordId::BIN_SIZE + node.bin_size());
        buf.extend_from_slice(&key.to_bytes());
        buf.extend_from_slice(node.as_bytes());

        let digest = md5::compute(&buf);
        self.release(buf);

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.0[..8]);
        u64::from_le_bytes(head)
    }
}

/// Scores each node with a fixed weight regardless of key. Nodes without a
/// weight score 0. Useful when a test needs a known ranking.
#[derive(Debug, Clone, Default)]
pub struct FixedHasher {
    weights: HashMap<NodeAddr, u64>,
}

impl FixedHasher {
    pub fn new(weights: impl IntoIterator<Item = (NodeAddr, u64)>) -> Self {
        Self {
            weights: weights.into_iter().collect(),
        }
    }
}

impl NodeHasher for FixedHasher {
    fn hash(&self, _key: RecordId, node: &NodeAddr) -> u64 {
        self.weights.get(node).copied().unwrap_or(0)
    }
}
