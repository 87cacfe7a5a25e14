pub mod config;
pub mod health;
pub mod node;

pub use config::RouterConfig;
pub use health::{HeartbeatTable, NodeHealth};
pub use node::{NodeAddr, RecordId};
