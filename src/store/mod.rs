//! Persistence boundary for users, posts and replies.
//!
//! Controllers only see [`ForumStore`], which exposes the handful of query
//! shapes the forum needs: paginated post listings with author projections,
//! filter-and-update by id and owner, and point lookups for ownership checks.
//! Two implementations exist: [`postgres::PgStore`] for deployments and
//! [`memory::MemoryStore`] for development runs and tests.

pub mod memory;
pub mod postgres;

#[cfg(test)]
pub(crate) mod failing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Text columns are `VARCHAR(255)`; longer values are rejected by storage.
pub const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("missing reference: {0}")]
    MissingReference(&'static str),
    #[error("constraint violated: {0}")]
    Constraint(&'static str),
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub credential: String,
    pub nickname: String,
    pub mobile: String,
    pub url: String,
    pub magic_number: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub credential: String,
    pub nickname: String,
    pub mobile: String,
    pub url: String,
    pub magic_number: i64,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub last_replied_user_id: i64,
    pub last_replied_time: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    /// `None` when the reply answers the post itself.
    pub reply_id: Option<i64>,
    pub content: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub user_id: i64,
    pub post_id: i64,
    pub reply_id: Option<i64>,
    pub content: String,
}

/// A post joined with its author's and last replier's nicknames.
#[derive(Debug, Clone)]
pub struct PostSummary {
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

/// A reply joined with its author's nickname.
#[derive(Debug, Clone)]
pub struct ReplySummary {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub post_id: i64,
    pub reply_id: Option<i64>,
    pub content: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostSummary,
    /// Ordered by creation time, oldest first.
    pub replies: Vec<ReplySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Most recently updated first.
    #[default]
    Updated,
    /// Most recently replied first.
    LastReplied,
}

/// Filter, ordering and 1-indexed window for a post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    /// `None` lists posts from every user.
    pub user_id: Option<i64>,
    pub order: PostOrder,
    pub page: u32,
    pub size: u32,
}

impl PostQuery {
    /// Number of rows skipped before the window starts.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[async_trait]
pub trait ForumStore: Send + Sync {
    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert a user and return its id. Duplicate usernames yield [`StoreError::Conflict`].
    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Return the requested window and the total number of posts matching the filter.
    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<PostSummary>, i64), StoreError>;

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError>;

    async fn post_detail(&self, id: i64) -> Result<Option<PostDetail>, StoreError>;

    /// Insert a post; its last-replied fields start as the author and creation time.
    async fn create_post(&self, post: NewPost) -> Result<i64, StoreError>;

    /// Update title and content of a post owned by `user_id`. Returns `false` if no row matched.
    async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<bool, StoreError>;

    async fn find_reply(&self, id: i64) -> Result<Option<Reply>, StoreError>;

    /// Insert a reply and bump the parent post's last-replied fields in one unit.
    async fn create_reply(&self, reply: NewReply) -> Result<i64, StoreError>;

    /// Update a reply owned by `user_id` and bump its post's last-replied fields in one unit.
    /// Returns `false` if no row matched.
    async fn update_reply(
        &self,
        id: i64,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<bool, StoreError>;
}
