//! HTTP handlers. Each one only unpacks the request and calls into
//! [`crate::forum::Forum`]; rejections from axum extractors are folded into the
//! forum's error responses so every failure keeps the `{"message"}` shape.

use axum::{
    Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::Value;
use tracing::debug;

use crate::forum::ForumError;

pub mod health;
pub mod posts;
pub mod users;


/// Unreadable or non-JSON bodies are a bad request.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ForumError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        debug!("Rejected request body: {rejection}");
        ForumError::BadRequest
    })
}

/// Ids that do not parse cannot name an existing resource.
pub(crate) fn path_ids<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ForumError> {
    path.map(|Path(ids)| ids).map_err(|rejection| {
        debug!("Rejected path: {rejection}");
        ForumError::NotFound
    })
}
