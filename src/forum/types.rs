//! Request and response shapes at the HTTP boundary (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::store::{PostDetail, PostSummary, ReplySummary, User};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            message: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub nickname: String,
    /// `+CC.NNNNNNNNNNNN`
    pub mobile: String,
    pub url: String,
    #[serde(default)]
    pub magic_number: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub jwt: String,
    pub user_id: i64,
    pub username: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub content: String,
    /// Reply being answered; omit or send `0` to answer the post.
    #[serde(default)]
    pub reply_id: Option<i64>,
}

/// Query string of `GET /post`. Values are kept raw and parsed by the validator.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// 1-indexed page, default 1.
    pub page: Option<String>,
    /// Page size, default 10, at most 100.
    pub size: Option<String>,
    /// Author filter; 0 or absent lists every user.
    pub user_id: Option<String>,
    /// `true` sorts by last reply instead of last update.
    pub order_by_reply: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub post_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub title: String,
    pub content: String,
    pub last_replied_user_id: i64,
    pub last_replied_nickname: String,
    pub last_replied_time: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(post: PostSummary) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            nickname: post.nickname,
            title: post.title,
            content: post.content,
            last_replied_user_id: post.last_replied_user_id,
            last_replied_nickname: post.last_replied_nickname,
            last_replied_time: post.last_replied_time,
            created: post.created,
            updated: post.updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    pub posts: Vec<PostSummaryResponse>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub post_id: i64,
    /// 0 when the reply answers the post directly.
    pub reply_id: i64,
    pub content: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<ReplySummary> for ReplyResponse {
    fn from(reply: ReplySummary) -> Self {
        Self {
            id: reply.id,
            user_id: reply.user_id,
            nickname: reply.nickname,
            post_id: reply.post_id,
            reply_id: reply.reply_id.unwrap_or(0),
            content: reply.content,
            created: reply.created,
            updated: reply.updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub title: String,
    pub content: String,
    pub last_replied_user_id: i64,
    pub last_replied_nickname: String,
    pub last_replied_time: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Oldest first.
    pub reply: Vec<ReplyResponse>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        let post = detail.post;
        Self {
            id: post.id,
            user_id: post.user_id,
            nickname: post.nickname,
            title: post.title,
            content: post.content,
            last_replied_user_id: post.last_replied_user_id,
            last_replied_nickname: post.last_replied_nickname,
            last_replied_time: post.last_replied_time,
            created: post.created,
            updated: post.updated,
            reply: detail.replies.into_iter().map(ReplyResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub created: DateTime<Utc>,
    pub url: String,
    pub mobile: String,
    pub magic_number: i64,
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            nickname: user.nickname,
            created: user.created,
            url: user.url,
            mobile: user.mobile,
            magic_number: user.magic_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    pub id: i64,
    pub nickname: String,
    pub created: DateTime<Utc>,
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            created: user.created,
        }
    }
}
