//! In-process store backed by ordered maps behind a single lock.
//!
//! Used when the server runs without a DSN and throughout the test suite. Each
//! write takes the lock once, so a reply insert and the post bump it causes
//! are observed together.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{
    ForumStore, MAX_TEXT_LEN, NewPost, NewReply, NewUser, Post, PostDetail, PostOrder, PostQuery,
    PostSummary, Reply, ReplySummary, StoreError, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    replies: BTreeMap<i64, Reply>,
    last_user_id: i64,
    last_post_id: i64,
    last_reply_id: i64,
}

impl Tables {
    fn nickname(&self, user_id: i64) -> String {
        self.users
            .get(&user_id)
            .map(|user| user.nickname.clone())
            .unwrap_or_default()
    }

    fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            id: post.id,
            user_id: post.user_id,
            nickname: self.nickname(post.user_id),
            title: post.title.clone(),
            content: post.content.clone(),
            last_replied_user_id: post.last_replied_user_id,
            last_replied_nickname: self.nickname(post.last_replied_user_id),
            last_replied_time: post.last_replied_time,
            created: post.created,
            updated: post.updated,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_len(value: &str, column: &'static str) -> Result<(), StoreError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::Constraint(column));
    }
    Ok(())
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError> {
        check_len(&user.nickname, "users.nickname")?;
        check_len(&user.mobile, "users.mobile")?;
        check_len(&user.url, "users.url")?;
        check_len(&user.credential, "users.credential")?;
        if user.username.chars().count() > 32 {
            return Err(StoreError::Constraint("users.username"));
        }

        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(StoreError::Conflict("username already exists"));
        }

        tables.last_user_id += 1;
        let id = tables.last_user_id;
        let now = Utc::now();
        tables.users.insert(
            id,
            User {
                id,
                username: user.username,
                credential: user.credential,
                nickname: user.nickname,
                mobile: user.mobile,
                url: user.url,
                magic_number: user.magic_number,
                created: now,
                updated: now,
            },
        );
        Ok(id)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<PostSummary>, i64), StoreError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| query.user_id.is_none_or(|user_id| post.user_id == user_id))
            .collect();

        matching.sort_by(|a, b| {
            let (ka, kb) = match query.order {
                PostOrder::Updated => (a.updated, b.updated),
                PostOrder::LastReplied => (a.last_replied_time, b.last_replied_time),
            };
            kb.cmp(&ka).then_with(|| b.id.cmp(&a.id))
        });

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(0);

        let rows = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|post| tables.summarize(post))
            .collect();

        Ok((rows, total))
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn post_detail(&self, id: i64) -> Result<Option<PostDetail>, StoreError> {
        let tables = self.tables.read().await;
        let Some(post) = tables.posts.get(&id) else {
            return Ok(None);
        };

        let mut replies: Vec<ReplySummary> = tables
            .replies
            .values()
            .filter(|reply| reply.post_id == id)
            .map(|reply| ReplySummary {
                id: reply.id,
                user_id: reply.user_id,
                nickname: tables.nickname(reply.user_id),
                post_id: reply.post_id,
                reply_id: reply.reply_id,
                content: reply.content.clone(),
                created: reply.created,
                updated: reply.updated,
            })
            .collect();
        replies.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));

        Ok(Some(PostDetail {
            post: tables.summarize(post),
            replies,
        }))
    }

    async fn create_post(&self, post: NewPost) -> Result<i64, StoreError> {
        check_len(&post.title, "posts.title")?;
        check_len(&post.content, "posts.content")?;

        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.user_id) {
            return Err(StoreError::MissingReference("posts.user_id"));
        }

        tables.last_post_id += 1;
        let id = tables.last_post_id;
        let now = Utc::now();
        tables.posts.insert(
            id,
            Post {
                id,
                user_id: post.user_id,
                title: post.title,
                content: post.content,
                last_replied_user_id: post.user_id,
                last_replied_time: now,
                created: now,
                updated: now,
            },
        );
        Ok(id)
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<bool, StoreError> {
        check_len(title, "posts.title")?;
        check_len(content, "posts.content")?;

        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&id) {
            Some(post) if post.user_id == user_id => {
                post.title = title.to_string();
                post.content = content.to_string();
                post.updated = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_reply(&self, id: i64) -> Result<Option<Reply>, StoreError> {
        Ok(self.tables.read().await.replies.get(&id).cloned())
    }

    async fn create_reply(&self, reply: NewReply) -> Result<i64, StoreError> {
        check_len(&reply.content, "replies.content")?;

        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&reply.user_id) {
            return Err(StoreError::MissingReference("replies.user_id"));
        }
        if let Some(parent) = reply.reply_id
            && !tables.replies.contains_key(&parent)
        {
            return Err(StoreError::MissingReference("replies.reply_id"));
        }

        let now = Utc::now();
        let Some(post) = tables.posts.get_mut(&reply.post_id) else {
            return Err(StoreError::MissingReference("replies.post_id"));
        };
        post.last_replied_user_id = reply.user_id;
        post.last_replied_time = now;

        tables.last_reply_id += 1;
        let id = tables.last_reply_id;
        tables.replies.insert(
            id,
            Reply {
                id,
                user_id: reply.user_id,
                post_id: reply.post_id,
                reply_id: reply.reply_id,
                content: reply.content,
                created: now,
                updated: now,
            },
        );
        Ok(id)
    }

    async fn update_reply(
        &self,
        id: i64,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<bool, StoreError> {
        check_len(content, "replies.content")?;

        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match tables.replies.get_mut(&id) {
            Some(reply) if reply.user_id == user_id && reply.post_id == post_id => {
                reply.content = content.to_string();
                reply.updated = now;
            }
            _ => return Ok(false),
        }
        if let Some(post) = tables.posts.get_mut(&post_id) {
            post.last_replied_user_id = user_id;
            post.last_replied_time = now;
        }
        Ok(true)
    }
}
