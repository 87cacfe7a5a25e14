use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use crate::sharding::ShardRouter;

pub fn create_router(router: Arc<ShardRouter>) -> Router {
    let state = AppState { router };

    Router::new()
        .route("/_api/heartbeat", post(heartbeat))
        .route("/_api/nodes", get(list_nodes))
        .route("/_api/nodes/status", get(node_status))
        .route("/_api/nodes/find/{key}", get(find_nodes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
