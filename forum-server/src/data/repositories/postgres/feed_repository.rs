use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::errors::unexpected;
use crate::data::feed_repository::FeedRepository;
use crate::domain::detail::{CommentDetail, DetailRow};
use crate::domain::error::DomainError;
use crate::domain::feed::{CommentPreview, FeedFilter, FeedRow, PostSummary};
use crate::domain::reaction::ReactionCounts;

#[derive(Debug, Clone)]
pub(crate) struct PostgresFeedRepository {
    pool: PgPool,
}

impl PostgresFeedRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Post columns plus aggregated categories and post-level reaction counts.
const POST_COLUMNS: &str = r#"
    p.id AS post_id,
    p.author_id,
    u.username AS author_name,
    p.title,
    p.body,
    cat.names AS category_names,
    p.created_at,
    (SELECT COUNT(*) FROM post_reactions pr WHERE pr.post_id = p.id AND pr.value = 1) AS likes,
    (SELECT COUNT(*) FROM post_reactions pr WHERE pr.post_id = p.id AND pr.value = -1) AS dislikes
"#;

const POST_JOINS: &str = r#"
FROM posts p
JOIN users u ON u.id = p.author_id
JOIN (
    SELECT pc.post_id, STRING_AGG(c.name, ', ' ORDER BY c.name) AS names
    FROM post_categories pc
    JOIN categories c ON c.id = pc.category_id
    GROUP BY pc.post_id
) cat ON cat.post_id = p.id
"#;

#[derive(sqlx::FromRow)]
struct FeedRecord {
    post_id: i64,
    author_id: i64,
    author_name: String,
    title: String,
    body: String,
    category_names: String,
    created_at: DateTime<Utc>,
    likes: i64,
    dislikes: i64,
    comment_id: Option<i64>,
    comment_author_name: Option<String>,
    comment_body: Option<String>,
}

impl FeedRecord {
    fn into_row(self) -> Result<FeedRow, DomainError> {
        let comment = match (self.comment_id, self.comment_author_name, self.comment_body) {
            (None, _, _) => None,
            (Some(_), Some(author_name), Some(body)) => Some(CommentPreview { author_name, body }),
            (Some(id), _, _) => {
                return Err(DomainError::Unexpected(format!(
                    "comment {id} joined without author or body"
                )));
            }
        };

        Ok(FeedRow {
            post: PostSummary {
                id: self.post_id,
                author_id: self.author_id,
                author_name: self.author_name,
                title: self.title,
                body: self.body,
                category_names: self.category_names,
                created_at: self.created_at,
                reactions: ReactionCounts {
                    likes: self.likes,
                    dislikes: self.dislikes,
                },
            },
            comment,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DetailRecord {
    post_id: i64,
    author_id: i64,
    author_name: String,
    title: String,
    body: String,
    category_names: String,
    created_at: DateTime<Utc>,
    likes: i64,
    dislikes: i64,
    comment_id: Option<i64>,
    comment_author_id: Option<i64>,
    comment_author_name: Option<String>,
    comment_body: Option<String>,
    comment_created_at: Option<DateTime<Utc>>,
    comment_likes: i64,
    comment_dislikes: i64,
}

impl DetailRecord {
    fn into_row(self) -> Result<DetailRow, DomainError> {
        let comment = match self.comment_id {
            None => None,
            Some(id) => {
                let (Some(author_id), Some(author_name), Some(body), Some(created_at)) = (
                    self.comment_author_id,
                    self.comment_author_name,
                    self.comment_body,
                    self.comment_created_at,
                ) else {
                    return Err(DomainError::Unexpected(format!(
                        "comment {id} joined with missing columns"
                    )));
                };
                Some(CommentDetail {
                    id,
                    author_id,
                    author_name,
                    body,
                    created_at,
                    reactions: ReactionCounts {
                        likes: self.comment_likes,
                        dislikes: self.comment_dislikes,
                    },
                })
            }
        };

        Ok(DetailRow {
            post: PostSummary {
                id: self.post_id,
                author_id: self.author_id,
                author_name: self.author_name,
                title: self.title,
                body: self.body,
                category_names: self.category_names,
                created_at: self.created_at,
                reactions: ReactionCounts {
                    likes: self.likes,
                    dislikes: self.dislikes,
                },
            },
            comment,
        })
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: FeedFilter) {
    match filter {
        FeedFilter::All => {}
        FeedFilter::MineOnly(user_id) => {
            builder.push(" WHERE p.author_id = ");
            builder.push_bind(user_id);
        }
        FeedFilter::LikedOnly(user_id) => {
            builder.push(
                " WHERE EXISTS (SELECT 1 FROM post_reactions lr \
                 WHERE lr.post_id = p.id AND lr.value = 1 AND lr.user_id = ",
            );
            builder.push_bind(user_id);
            builder.push(")");
        }
        FeedFilter::ByCategory(category_id) => {
            builder.push(
                " WHERE EXISTS (SELECT 1 FROM post_categories fc \
                 WHERE fc.post_id = p.id AND fc.category_id = ",
            );
            builder.push_bind(category_id);
            builder.push(")");
        }
    }
}

#[async_trait]
impl FeedRepository for PostgresFeedRepository {
    async fn feed_rows(
        &self,
        filter: FeedFilter,
        comment_limit: u32,
    ) -> Result<Vec<FeedRow>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT");
        builder.push(POST_COLUMNS);
        builder.push(
            r#",
    cm.id AS comment_id,
    cu.username AS comment_author_name,
    cm.body AS comment_body
"#,
        );
        builder.push(POST_JOINS);
        builder.push(
            r#"
LEFT JOIN (
    SELECT c.id, c.post_id, c.author_id, c.body,
           ROW_NUMBER() OVER (PARTITION BY c.post_id ORDER BY c.created_at DESC, c.id DESC) AS rn
    FROM comments c
) cm ON cm.post_id = p.id AND cm.rn <= "#,
        );
        builder.push_bind(i64::from(comment_limit));
        builder.push("\nLEFT JOIN users cu ON cu.id = cm.author_id\n");
        push_filter(&mut builder, filter);
        builder.push("\nORDER BY p.created_at DESC, p.id DESC, cm.rn ASC");

        let records = builder
            .build_query_as::<FeedRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(FeedRecord::into_row).collect()
    }

    async fn detail_rows(&self, post_id: i64) -> Result<Vec<DetailRow>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT");
        builder.push(POST_COLUMNS);
        builder.push(
            r#",
    cm.id AS comment_id,
    cm.author_id AS comment_author_id,
    cu.username AS comment_author_name,
    cm.body AS comment_body,
    cm.created_at AS comment_created_at,
    (SELECT COUNT(*) FROM comment_reactions cr WHERE cr.comment_id = cm.id AND cr.value = 1) AS comment_likes,
    (SELECT COUNT(*) FROM comment_reactions cr WHERE cr.comment_id = cm.id AND cr.value = -1) AS comment_dislikes
"#,
        );
        builder.push(POST_JOINS);
        builder.push(
            r#"
LEFT JOIN comments cm ON cm.post_id = p.id
LEFT JOIN users cu ON cu.id = cm.author_id
WHERE p.id = "#,
        );
        builder.push_bind(post_id);
        builder.push("\nORDER BY cm.created_at ASC, cm.id ASC");

        let records = builder
            .build_query_as::<DetailRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(DetailRecord::into_row).collect()
    }
}
