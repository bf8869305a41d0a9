use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::errors::{DbFailure, classify, unexpected};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    body: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        // The post foreign key doubles as the existence check.
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, author_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, body, created_at
            "#,
        )
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match classify(&err) {
            DbFailure::ForeignKeyViolation {
                constraint: Some("comments_post_id_fkey"),
            } => DomainError::NotFound(format!("post id: {}", input.post_id)),
            DbFailure::ForeignKeyViolation { .. } => DomainError::NotFound("author".to_string()),
            _ => unexpected(err),
        })?;

        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            body: row.body,
            created_at: row.created_at,
        })
    }
}
