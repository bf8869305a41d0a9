use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::errors::{DbFailure, classify, unexpected};
use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<i64, DomainError> {
        if input.category_ids.is_empty() {
            return Err(DomainError::Validation {
                field: "category_ids",
                message: "must contain at least one category",
            });
        }

        // Dropping `tx` on any early return rolls the post back.
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let post_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (author_id, title, body)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.author_id)
        .bind(&input.title)
        .bind(&input.body)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO post_categories (post_id, category_id)
            SELECT $1, category_id
            FROM UNNEST($2::BIGINT[]) AS category_id
            "#,
        )
        .bind(post_id)
        .bind(&input.category_ids)
        .execute(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        tx.commit().await.map_err(unexpected)?;

        info!(
            post_id,
            author_id = input.author_id,
            categories = input.category_ids.len(),
            "post created"
        );
        Ok(post_id)
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    match classify(&err) {
        DbFailure::ForeignKeyViolation { constraint } => {
            let resource = match constraint {
                Some("post_categories_category_id_fkey") => "category",
                _ => "author",
            };
            DomainError::NotFound(resource.to_string())
        }
        DbFailure::UniqueViolation { .. } => {
            DomainError::Conflict("duplicate category for post".to_string())
        }
        DbFailure::Other => unexpected(err),
    }
}
