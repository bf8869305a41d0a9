use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::reaction::ReactionCounts;
use super::validation::validate_positive_i64;

pub(crate) const DEFAULT_COMMENT_LIMIT: u32 = 3;

/// Raw listing options as they arrive from the boundary layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FeedSelection {
    pub(crate) mine_only: bool,
    pub(crate) liked_only: bool,
    pub(crate) category_id: Option<i64>,
}

impl FeedSelection {
    /// Keeps the highest-priority option only: liked, then mine, then category.
    pub(crate) fn with_precedence(self) -> Self {
        if self.liked_only {
            Self {
                liked_only: true,
                ..Self::default()
            }
        } else if self.mine_only {
            Self {
                mine_only: true,
                ..Self::default()
            }
        } else {
            self
        }
    }

    /// Resolves the selection into exactly one filter mode. Combinations are
    /// rejected; personal modes need a viewer.
    pub(crate) fn into_filter(self, viewer_id: Option<i64>) -> Result<FeedFilter, DomainError> {
        let selected = [self.mine_only, self.liked_only, self.category_id.is_some()]
            .into_iter()
            .filter(|flag| *flag)
            .count();
        if selected > 1 {
            return Err(DomainError::Validation {
                field: "filter",
                message: "must select at most one of mine, liked, category",
            });
        }

        if self.mine_only {
            return viewer_id
                .map(FeedFilter::MineOnly)
                .ok_or(DomainError::Unauthorized);
        }
        if self.liked_only {
            return viewer_id
                .map(FeedFilter::LikedOnly)
                .ok_or(DomainError::Unauthorized);
        }
        if let Some(category_id) = self.category_id {
            validate_positive_i64("category_id", category_id)?;
            return Ok(FeedFilter::ByCategory(category_id));
        }
        Ok(FeedFilter::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedFilter {
    All,
    MineOnly(i64),
    LikedOnly(i64),
    ByCategory(i64),
}

/// Post columns shared by feed cards and the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostSummary {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) category_names: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) reactions: ReactionCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommentPreview {
    pub(crate) author_name: String,
    pub(crate) body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostCard {
    pub(crate) post: PostSummary,
    pub(crate) comments: Vec<CommentPreview>,
}

/// One row of the post x preview-comment join. A post without comments
/// still yields one row, with `comment` set to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedRow {
    pub(crate) post: PostSummary,
    pub(crate) comment: Option<CommentPreview>,
}

/// Folds flattened join rows into one card per post.
///
/// Cards keep the order in which their post first appears; comments are
/// appended in row order, so interleaved and clustered inputs produce the
/// same result as long as each post's own comments keep their order.
pub(crate) fn fold_feed_rows<I>(rows: I) -> Vec<PostCard>
where
    I: IntoIterator<Item = FeedRow>,
{
    let mut cards: Vec<PostCard> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let position = match index.entry(row.post.id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                cards.push(PostCard {
                    post: row.post,
                    comments: Vec::new(),
                });
                *entry.insert(cards.len() - 1)
            }
        };

        if let Some(comment) = row.comment {
            cards[position].comments.push(comment);
        }
    }

    cards
}
