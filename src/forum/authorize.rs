//! Ownership and existence checks run before a mutation.
//!
//! Every check answers with a plain `bool`. Missing rows and storage failures
//! both read as `false`; callers turn that into a 404 so a client cannot tell
//! "not yours" from "does not exist".

use tracing::warn;

use crate::store::{ForumStore, StoreError};

fn fold<T>(check: &str, result: Result<Option<T>, StoreError>) -> Option<T> {
    match result {
        Ok(row) => row,
        Err(err) => {
            warn!("Authorization check {check} failed: {err}");
            None
        }
    }
}

/// The post exists and belongs to `user_id`.
pub async fn is_post_owner(store: &dyn ForumStore, post_id: i64, user_id: i64) -> bool {
    fold("is_post_owner", store.find_post(post_id).await).is_some_and(|post| post.user_id == user_id)
}

/// With `reply_id` 0 the post must exist; otherwise the reply must exist and
/// belong to `post_id`.
pub async fn is_valid_reply_target(store: &dyn ForumStore, post_id: i64, reply_id: i64) -> bool {
    if reply_id == 0 {
        fold("is_valid_reply_target", store.find_post(post_id).await).is_some()
    } else {
        fold("is_valid_reply_target", store.find_reply(reply_id).await)
            .is_some_and(|reply| reply.post_id == post_id)
    }
}

/// The reply exists and belongs to `user_id`.
pub async fn is_reply_owner(store: &dyn ForumStore, reply_id: i64, user_id: i64) -> bool {
    fold("is_reply_owner", store.find_reply(reply_id).await).is_some_and(|reply| reply.user_id == user_id)
}
