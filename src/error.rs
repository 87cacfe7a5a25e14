use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::cluster::node::NodeAddr;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Not enough daemons: {available} available, {required} required")]
    NotEnoughDaemons { required: usize, available: usize },

    #[error("Unknown daemon '{0}'")]
    UnknownDaemon(NodeAddr),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type RouterResult<T> = Result<T, RouterError>;

impl RouterError {
    /// Variant name without payload, used as the `type` field of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::NotEnoughDaemons { .. } => "NotEnoughDaemons",
            RouterError::UnknownDaemon(_) => "UnknownDaemon",
            RouterError::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

impl serde::Serialize for RouterError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouterError::NotEnoughDaemons { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RouterError::UnknownDaemon(_) => StatusCode::NOT_FOUND,
            RouterError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
            "type": self.kind(),
        });

        (status, Json(body)).into_response()
    }
}
