//! A store whose every call fails, for exercising error paths.

use async_trait::async_trait;

use super::{
    ForumStore, NewPost, NewReply, NewUser, Post, PostDetail, PostQuery, PostSummary, Reply,
    StoreError, User,
};

fn fault() -> StoreError {
    StoreError::Constraint("store unavailable")
}

#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[async_trait]
impl ForumStore for FailingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Err(fault())
    }

    async fn create_user(&self, _user: NewUser) -> Result<i64, StoreError> {
        Err(fault())
    }

    async fn find_user_by_id(&self, _id: i64) -> Result<Option<User>, StoreError> {
        Err(fault())
    }

    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Err(fault())
    }

    async fn list_posts(&self, _query: &PostQuery) -> Result<(Vec<PostSummary>, i64), StoreError> {
        Err(fault())
    }

    async fn find_post(&self, _id: i64) -> Result<Option<Post>, StoreError> {
        Err(fault())
    }

    async fn post_detail(&self, _id: i64) -> Result<Option<PostDetail>, StoreError> {
        Err(fault())
    }

    async fn create_post(&self, _post: NewPost) -> Result<i64, StoreError> {
        Err(fault())
    }

    async fn update_post(
        &self,
        _id: i64,
        _user_id: i64,
        _title: &str,
        _content: &str,
    ) -> Result<bool, StoreError> {
        Err(fault())
    }

    async fn find_reply(&self, _id: i64) -> Result<Option<Reply>, StoreError> {
        Err(fault())
    }

    async fn create_reply(&self, _reply: NewReply) -> Result<i64, StoreError> {
        Err(fault())
    }

    async fn update_reply(
        &self,
        _id: i64,
        _user_id: i64,
        _post_id: i64,
        _content: &str,
    ) -> Result<bool, StoreError> {
        Err(fault())
    }
}
