use async_trait::async_trait;

use crate::domain::detail::DetailRow;
use crate::domain::error::DomainError;
use crate::domain::feed::{FeedFilter, FeedRow};

/// Read side of the forum: flattened post x comment rows, ready to be folded.
#[async_trait]
pub(crate) trait FeedRepository: Send + Sync {
    /// Rows ordered by post `created_at DESC, id DESC`, then by each post's
    /// comments newest first, at most `comment_limit` comments per post.
    async fn feed_rows(
        &self,
        filter: FeedFilter,
        comment_limit: u32,
    ) -> Result<Vec<FeedRow>, DomainError>;

    /// Rows of one post with all of its comments, oldest first. Empty when
    /// the post does not exist.
    async fn detail_rows(&self, post_id: i64) -> Result<Vec<DetailRow>, DomainError>;
}
