//! Comment write path.
//!
//! A new comment is prepended to the cached `product_{id}_comments` list. Inserting the row into
//! the backing store is opt-in (`cache.persist_comments`); without it the comment lives only in
//! the cache until the next reset.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    application::{
        error::AppError,
        repos::{CommentsRepo, CreateCommentParams},
    },
    cache::{CacheClient, CacheKey},
    domain::{
        clock::store_now,
        entities::{CachedComment, UserRecord},
        error::DomainError,
    },
};

#[derive(Clone)]
pub struct CommentService {
    cache: CacheClient,
    comments: Arc<dyn CommentsRepo>,
    persist: bool,
}

impl CommentService {
    pub fn new(cache: CacheClient, comments: Arc<dyn CommentsRepo>, persist: bool) -> Self {
        Self {
            cache,
            comments,
            persist,
        }
    }

    /// Post `content` on `product_id` as `user_id`; returns the cached comment count.
    ///
    /// The author must already be cached; a missing `user_{id}` entry is an invariant failure.
    pub async fn post(
        &self,
        product_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<usize, AppError> {
        let author: UserRecord = self
            .cache
            .get(&CacheKey::User(user_id))
            .await?
            .ok_or_else(|| {
                DomainError::invariant(format!("user {user_id} is missing from the cache"))
            })?;

        if self.persist {
            let comment_id = self
                .comments
                .create_comment(CreateCommentParams {
                    product_id,
                    user_id,
                    content: content.to_string(),
                    created_at: store_now(),
                })
                .await?;
            debug!(
                target = "storefront::comments",
                comment_id, "comment row inserted"
            );
        }

        let count = self
            .cache
            .prepend(
                &CacheKey::ProductComments(product_id),
                &CachedComment::submitted(content, author.name),
            )
            .await?;

        info!(
            target = "storefront::comments",
            product_id, user_id, count, "comment cached"
        );

        Ok(count)
    }
}
