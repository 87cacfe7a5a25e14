pub mod cluster;
pub mod error;
pub mod server;
pub mod sharding;

pub use cluster::{NodeAddr, RecordId, RouterConfig};
pub use error::{RouterError, RouterResult};
pub use server::create_router;
pub use sharding::{FixedHasher, Md5Hasher, NodeHasher, NodesFinder, ShardRouter};
