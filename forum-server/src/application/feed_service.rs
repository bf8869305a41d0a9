use tracing::debug;

use crate::data::feed_repository::FeedRepository;
use crate::domain::detail::{PostDetail, fold_detail_rows};
use crate::domain::error::DomainError;
use crate::domain::feed::{DEFAULT_COMMENT_LIMIT, FeedSelection, PostCard, fold_feed_rows};
use crate::domain::validation::validate_positive_i64;

pub(crate) struct FeedService<R: FeedRepository> {
    repo: R,
    comment_limit: u32,
}

impl<R: FeedRepository> FeedService<R> {
    pub(crate) fn new(repo: R, comment_limit: u32) -> Self {
        let comment_limit = if comment_limit == 0 {
            DEFAULT_COMMENT_LIMIT
        } else {
            comment_limit
        };
        Self {
            repo,
            comment_limit,
        }
    }

    /// Newest posts first, each with up to `comment_limit` newest comments.
    pub(crate) async fn list_posts(
        &self,
        selection: FeedSelection,
        viewer_id: Option<i64>,
    ) -> Result<Vec<PostCard>, DomainError> {
        let filter = selection.into_filter(viewer_id)?;
        let rows = self.repo.feed_rows(filter, self.comment_limit).await?;
        let row_count = rows.len();
        let cards = fold_feed_rows(rows);
        debug!(?filter, row_count, posts = cards.len(), "feed assembled");
        Ok(cards)
    }

    /// One post with every comment, oldest comment first.
    pub(crate) async fn get_post_detail(&self, post_id: i64) -> Result<PostDetail, DomainError> {
        validate_positive_i64("post_id", post_id)?;
        let rows = self.repo.detail_rows(post_id).await?;
        fold_detail_rows(rows)?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }
}
