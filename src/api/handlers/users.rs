use axum::{
    Json,
    extract::{
        Extension, Path,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::Value;
use std::sync::Arc;

use super::{json_body, path_ids};
use crate::auth::Principal;
use crate::forum::{
    Forum, ForumError,
    types::{
        CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        UserProfileResponse,
    },
};

#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created.", body = MessageResponse),
        (status = 400, description = "First invalid field, as `Invalid arguments: <field>`.", body = MessageResponse),
        (status = 500, description = "Storage failure.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn register(
    Extension(forum): Extension<Arc<Forum>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ForumError> {
    let body = json_body(body)?;
    forum.register(&body).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token and identity.", body = LoginResponse),
        (status = 400, description = "Missing username or password.", body = MessageResponse),
        (status = 401, description = "Unknown user or wrong password.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn login(
    Extension(forum): Extension<Arc<Forum>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LoginResponse>, ForumError> {
    let body = json_body(body)?;
    forum.login(&body).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Acknowledged.", body = MessageResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn logout(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
) -> Json<MessageResponse> {
    Json(forum.logout(&principal))
}

#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "The caller's profile.", body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "User no longer exists.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn current_user(
    Extension(forum): Extension<Arc<Forum>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<CurrentUserResponse>, ForumError> {
    forum.current_user(&principal).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile.", body = UserProfileResponse),
        (status = 401, description = "Missing or invalid token.", body = MessageResponse),
        (status = 404, description = "Unknown user.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn user_profile(
    Extension(forum): Extension<Arc<Forum>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserProfileResponse>, ForumError> {
    let user_id = path_ids(path)?;
    forum.user_profile(user_id).await.map(Json)
}
