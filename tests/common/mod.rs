//! Common test utilities for router tests
//!
//! Provides shared helpers for:
//! - Building node lists and configs
//! - Building routers with predictable rankings
//! - Driving the HTTP surface

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use shard_router::{create_router, FixedHasher, NodeAddr, NodesFinder, RouterConfig, ShardRouter};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub fn nodes(names: &[&str]) -> Vec<NodeAddr> {
    names.iter().map(|n| NodeAddr::from(*n)).collect()
}

pub fn config(nodes: Vec<NodeAddr>) -> RouterConfig {
    RouterConfig::new(nodes, Duration::from_secs(5))
}

/// Router whose ranking follows `weights`, highest first
pub fn weighted_router(nodes: &[NodeAddr], weights: &[u64]) -> ShardRouter {
    let hasher = FixedHasher::new(nodes.iter().cloned().zip(weights.iter().copied()));
    ShardRouter::new(config(nodes.to_vec()), NodesFinder::new(Arc::new(hasher), 3))
        .expect("Failed to build router")
}

pub fn test_app(router: ShardRouter) -> (axum::Router, Arc<ShardRouter>) {
    let router = Arc::new(router);
    (create_router(router.clone()), router)
}

pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
