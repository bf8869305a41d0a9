use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::errors::{DbFailure, classify, unexpected};
use crate::data::session_repository::SessionRepository;
use crate::domain::error::DomainError;
use crate::domain::session::Session;

#[derive(Debug, Clone)]
pub(crate) struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn replace_for_user(&self, session: &Session) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Locking the user row serializes concurrent logins of the same user.
        let locked = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(session.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;
        if locked.is_none() {
            return Err(DomainError::NotFound(format!("user id: {}", session.user_id)));
        }

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(session.user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| match classify(&err) {
            DbFailure::UniqueViolation { .. } => {
                DomainError::Conflict("session token already issued".to_string())
            }
            _ => unexpected(err),
        })?;

        tx.commit().await.map_err(unexpected)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token, user_id, expires_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.map(|r| Session {
            token: r.token,
            user_id: r.user_id,
            expires_at: r.expires_at,
        }))
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(result.rows_affected() > 0)
    }
}
