use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cluster::health::NodeHealth;
use crate::cluster::node::{NodeAddr, RecordId};
use crate::error::RouterError;
use crate::sharding::ShardRouter;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ShardRouter>,
}

// ==================== Request/Response Types ====================

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub node: NodeAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListNodesResponse {
    pub nodes: Vec<NodeAddr>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindNodesResponse {
    pub key: RecordId,
    pub nodes: Vec<NodeAddr>,
}

#[derive(Debug, Serialize)]
pub struct NodeStatusResponse {
    pub nodes: Vec<NodeHealth>,
    pub replication_factor: usize,
    pub min_redundancy: usize,
    pub forget_timeout_ms: u64,
}

// ==================== Handlers ====================

pub async fn heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, RouterError> {
    state.router.heartbeat(&req.node)?;
    Ok(Json(HeartbeatResponse { ok: true }))
}

pub async fn list_nodes(State(state): State<AppState>) -> Json<ListNodesResponse> {
    Json(ListNodesResponse {
        nodes: state.router.list_nodes().to_vec(),
    })
}

pub async fn find_nodes(
    State(state): State<AppState>,
    Path(key): Path<u64>,
) -> Result<Json<FindNodesResponse>, RouterError> {
    let key = RecordId(key);
    let nodes = state.router.find_nodes(key)?;
    Ok(Json(FindNodesResponse { key, nodes }))
}

pub async fn node_status(State(state): State<AppState>) -> Json<NodeStatusResponse> {
    let router = &state.router;
    Json(NodeStatusResponse {
        nodes: router.node_statuses(),
        replication_factor: router.replication_factor(),
        min_redundancy: router.min_redundancy(),
        forget_timeout_ms: router.forget_timeout().as_millis() as u64,
    })
}
