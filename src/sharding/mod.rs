//! Replica selection and routing
//!
//! `hasher` scores (key, node) pairs, `finder` ranks nodes by score, and
//! `router` filters the ranking by heartbeat liveness.

pub mod finder;
pub mod hasher;
pub mod router;

pub use finder::NodesFinder;
pub use hasher::{FixedHasher, Md5Hasher, NodeHasher};
pub use router::ShardRouter;
