use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{json_body, path_ids};
use crate::auth::Principal;
use crate::forum::{
    Forum, ForumError,
    types::{
        CreatePostResponse, MessageResponse, PostDetailResponse, PostListQuery, PostListResponse,
        PostRequest, ReplyRequest,
    },
    validate::ListParams,
};

#[utoipa::path(
    get,
    path = "/api/v1/post",
    params(PostListQuery),
    responses(
        (status = 200, description = "One page of posts and the total count.", body = PostListResponse),
        (status = 400, description = "Malformed paging parameter.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(forum): Extension<Arc<Forum>>,
    query: Result<Query<PostListQuery>, QueryRejection>,
) -> Result<Json<PostListResponse>, ForumError> {
    let Query(query) = query.map_err(|rejection| {
        debug!("Rejected query: {rejection}");
        ForumError::BadRequest
    })?;
    let params = ListParams {
        page: query.page,
        size: query.size,
        user_id: query.user_id,
        order_by_reply: query.order_by_reply,
    };
    forum.list_posts(&params).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/post",
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post created.", body = CreatePostResponse),
        (status = 400, description = "Invalid body.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreatePostResponse>, ForumError> {
    let body = json_body(body)?;
    forum.create_post(&principal, &body).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/post/{post_id}",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post with its replies, oldest first.", body = PostDetailResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "Unknown post.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn post_detail(
    Extension(forum): Extension<Arc<Forum>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDetailResponse>, ForumError> {
    let post_id = path_ids(path)?;
    forum.post_detail(post_id).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/api/v1/post/{post_id}",
    params(("post_id" = i64, Path, description = "Post id, must be owned by the caller")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated.", body = MessageResponse),
        (status = 400, description = "Invalid body.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "Unknown post or not the caller's.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ForumError> {
    let post_id = path_ids(path)?;
    let body = json_body(body)?;
    forum.update_post(&principal, post_id, &body).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/post/{post_id}/reply",
    params(("post_id" = i64, Path, description = "Post being replied to")),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply created.", body = MessageResponse),
        (status = 400, description = "Invalid body.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "Unknown post, or reply target on another post.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn create_reply(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ForumError> {
    let post_id = path_ids(path)?;
    let body = json_body(body)?;
    forum.create_reply(&principal, post_id, &body).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/api/v1/post/{post_id}/reply/{reply_id}",
    params(
        ("post_id" = i64, Path, description = "Post the reply belongs to"),
        ("reply_id" = i64, Path, description = "Reply id, must be owned by the caller"),
    ),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply updated.", body = MessageResponse),
        (status = 400, description = "Invalid body.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "Unknown reply or not the caller's.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "posts"
)]
pub async fn update_reply(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ForumError> {
    let (post_id, reply_id) = path_ids(path)?;
    let body = json_body(body)?;
    forum
        .update_reply(&principal, post_id, reply_id, &body)
        .await
        .map(Json)
}
