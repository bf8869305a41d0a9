use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::feed::PostSummary;
use super::reaction::ReactionCounts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommentDetail {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) reactions: ReactionCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostDetail {
    pub(crate) post: PostSummary,
    pub(crate) comments: Vec<CommentDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetailRow {
    pub(crate) post: PostSummary,
    pub(crate) comment: Option<CommentDetail>,
}

/// Rebuilds a single post from its join rows.
///
/// Zero rows means the post does not exist (`Ok(None)`); a single row with no
/// comment is an existing post without comments.
pub(crate) fn fold_detail_rows<I>(rows: I) -> Result<Option<PostDetail>, DomainError>
where
    I: IntoIterator<Item = DetailRow>,
{
    let mut detail: Option<PostDetail> = None;

    for row in rows {
        match detail.as_mut() {
            Some(current) if current.post.id != row.post.id => {
                return Err(DomainError::Unexpected(format!(
                    "detail rows mix posts {} and {}",
                    current.post.id, row.post.id
                )));
            }
            Some(current) => current.comments.extend(row.comment),
            None => {
                detail = Some(PostDetail {
                    post: row.post,
                    comments: row.comment.into_iter().collect(),
                });
            }
        }
    }

    Ok(detail)
}
