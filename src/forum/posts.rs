//! Posts and replies: listing, detail, create and update.

use serde_json::Value;
use tracing::info;

use super::authorize::{is_post_owner, is_reply_owner, is_valid_reply_target};
use super::types::{
    CreatePostResponse, MessageResponse, PostDetailResponse, PostListResponse, PostSummaryResponse,
};
use super::validate::{self, ListParams};
use super::{Forum, ForumError, object};
use crate::auth::Principal;
use crate::store::{NewPost, NewReply};

impl Forum {
    /// One page of posts plus the total matching the author filter.
    ///
    /// # Errors
    /// `Validation` naming a malformed parameter, `Persistence` on storage failure.
    pub async fn list_posts(&self, params: &ListParams) -> Result<PostListResponse, ForumError> {
        let query = validate::list_params(params).map_err(|e| ForumError::Validation(e.0))?;
        let (posts, total) = self
            .store
            .list_posts(&query)
            .await
            .map_err(|err| ForumError::persistence("Failed to list posts", err))?;

        Ok(PostListResponse {
            posts: posts.into_iter().map(PostSummaryResponse::from).collect(),
            page: query.page,
            size: query.size,
            total,
        })
    }

    /// A post with its replies, oldest reply first.
    ///
    /// # Errors
    /// `NotFound` for an unknown post, `Persistence` on storage failure.
    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetailResponse, ForumError> {
        self.store
            .post_detail(post_id)
            .await
            .map_err(|err| ForumError::persistence("Failed to load post detail", err))?
            .map(PostDetailResponse::from)
            .ok_or(ForumError::NotFound)
    }

    /// # Errors
    /// `BadRequest`/`Validation` for a bad body, `Persistence` on storage failure.
    pub async fn create_post(
        &self,
        principal: &Principal,
        body: &Value,
    ) -> Result<CreatePostResponse, ForumError> {
        let input = validate::post(object(body)?).map_err(|e| ForumError::Validation(e.0))?;
        let post_id = self
            .store
            .create_post(NewPost {
                user_id: principal.user_id,
                title: input.title,
                content: input.content,
            })
            .await
            .map_err(|err| ForumError::persistence("Failed to create post", err))?;

        info!(post_id, user_id = principal.user_id, "Post created");
        Ok(CreatePostResponse {
            post_id,
            message: "ok".to_string(),
        })
    }

    /// Only the author may edit a post; anyone else gets `NotFound`.
    ///
    /// # Errors
    /// `BadRequest`/`Validation` for a bad body, `NotFound` when the caller does
    /// not own the post, `Persistence` on storage failure.
    pub async fn update_post(
        &self,
        principal: &Principal,
        post_id: i64,
        body: &Value,
    ) -> Result<MessageResponse, ForumError> {
        let input = validate::post(object(body)?).map_err(|e| ForumError::Validation(e.0))?;
        if !is_post_owner(self.store(), post_id, principal.user_id).await {
            return Err(ForumError::NotFound);
        }

        let updated = self
            .store
            .update_post(post_id, principal.user_id, &input.title, &input.content)
            .await
            .map_err(|err| ForumError::persistence("Failed to update post", err))?;
        if !updated {
            return Err(ForumError::NotFound);
        }
        Ok(MessageResponse::ok())
    }

    /// Reply to a post, or to one of its replies when `replyId` is given.
    ///
    /// # Errors
    /// `BadRequest`/`Validation` for a bad body, `NotFound` when the post or
    /// target reply does not exist or the reply belongs to another post,
    /// `Persistence` on storage failure.
    pub async fn create_reply(
        &self,
        principal: &Principal,
        post_id: i64,
        body: &Value,
    ) -> Result<MessageResponse, ForumError> {
        let input = validate::reply(object(body)?).map_err(|e| ForumError::Validation(e.0))?;
        if !is_valid_reply_target(self.store(), post_id, input.reply_id.unwrap_or(0)).await {
            return Err(ForumError::NotFound);
        }

        let reply_id = self
            .store
            .create_reply(NewReply {
                user_id: principal.user_id,
                post_id,
                reply_id: input.reply_id,
                content: input.content,
            })
            .await
            .map_err(|err| ForumError::persistence("Failed to create reply", err))?;

        info!(reply_id, post_id, user_id = principal.user_id, "Reply created");
        Ok(MessageResponse::ok())
    }

    /// Only the author may edit a reply, and only under its own post.
    ///
    /// # Errors
    /// `BadRequest`/`Validation` for a bad body, `NotFound` when the caller does
    /// not own the reply or it belongs to another post, `Persistence` on
    /// storage failure.
    pub async fn update_reply(
        &self,
        principal: &Principal,
        post_id: i64,
        reply_id: i64,
        body: &Value,
    ) -> Result<MessageResponse, ForumError> {
        let input = validate::reply(object(body)?).map_err(|e| ForumError::Validation(e.0))?;
        if !is_reply_owner(self.store(), reply_id, principal.user_id).await {
            return Err(ForumError::NotFound);
        }

        let updated = self
            .store
            .update_reply(reply_id, principal.user_id, post_id, &input.content)
            .await
            .map_err(|err| ForumError::persistence("Failed to update reply", err))?;
        if !updated {
            return Err(ForumError::NotFound);
        }
        Ok(MessageResponse::ok())
    }
}
