use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::errors::{DbFailure, classify, unexpected};
use crate::data::reaction_repository::ReactionRepository;
use crate::domain::error::DomainError;
use crate::domain::reaction::{
    ReactionChange, ReactionCounts, ReactionTarget, ReactionValue, TargetKind,
};

#[derive(Debug, Clone)]
pub(crate) struct PostgresReactionRepository {
    pool: PgPool,
}

impl PostgresReactionRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Table layout behind one target kind. Both kinds share the same toggle SQL.
struct TargetTables {
    targets: &'static str,
    reactions: &'static str,
    target_column: &'static str,
}

fn tables(kind: TargetKind) -> TargetTables {
    match kind {
        TargetKind::Post => TargetTables {
            targets: "posts",
            reactions: "post_reactions",
            target_column: "post_id",
        },
        TargetKind::Comment => TargetTables {
            targets: "comments",
            reactions: "comment_reactions",
            target_column: "comment_id",
        },
    }
}

#[derive(sqlx::FromRow)]
struct CountsRow {
    likes: i64,
    dislikes: i64,
}

#[async_trait]
impl ReactionRepository for PostgresReactionRepository {
    async fn apply_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
        requested: ReactionValue,
    ) -> Result<ReactionChange, DomainError> {
        let t = tables(target.kind);
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let exists_sql = format!("SELECT id FROM {} WHERE id = $1", t.targets);
        let exists = sqlx::query_scalar::<_, i64>(&exists_sql)
            .bind(target.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?;
        if exists.is_none() {
            return Err(not_found(target));
        }

        let select_sql = format!(
            "SELECT value FROM {} WHERE user_id = $1 AND {} = $2 FOR UPDATE",
            t.reactions, t.target_column
        );
        let existing = sqlx::query_scalar::<_, i16>(&select_sql)
            .bind(user_id)
            .bind(target.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?
            .map(ReactionValue::try_from)
            .transpose()
            .map_err(|err| DomainError::Unexpected(format!("stored reaction: {err}")))?;

        let change = ReactionChange::decide(existing, requested);
        let write_sql = match change {
            ReactionChange::Inserted(_) => format!(
                "INSERT INTO {} (user_id, {}, value) VALUES ($1, $2, $3)",
                t.reactions, t.target_column
            ),
            ReactionChange::Flipped(_) => format!(
                "UPDATE {} SET value = $3 WHERE user_id = $1 AND {} = $2",
                t.reactions, t.target_column
            ),
            ReactionChange::Removed => format!(
                "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
                t.reactions, t.target_column
            ),
        };

        let mut write = sqlx::query::<Postgres>(&write_sql).bind(user_id).bind(target.id);
        if let Some(value) = change.resulting() {
            write = write.bind(value.as_i16());
        }
        write
            .execute(&mut *tx)
            .await
            .map_err(|err| match classify(&err) {
                DbFailure::UniqueViolation { .. } => DomainError::Conflict(format!(
                    "reaction of user {user_id} on {} {}",
                    target.kind, target.id
                )),
                DbFailure::ForeignKeyViolation { .. } => not_found(target),
                DbFailure::Other => unexpected(err),
            })?;

        tx.commit().await.map_err(unexpected)?;

        debug!(
            user_id,
            target_kind = %target.kind,
            target_id = target.id,
            ?change,
            "reaction applied"
        );
        Ok(change)
    }

    async fn find_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
    ) -> Result<Option<ReactionValue>, DomainError> {
        let t = tables(target.kind);
        let sql = format!(
            "SELECT value FROM {} WHERE user_id = $1 AND {} = $2",
            t.reactions, t.target_column
        );

        sqlx::query_scalar::<_, i16>(&sql)
            .bind(user_id)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(ReactionValue::try_from)
            .transpose()
            .map_err(|err| DomainError::Unexpected(format!("stored reaction: {err}")))
    }

    async fn reaction_counts(&self, target: ReactionTarget) -> Result<ReactionCounts, DomainError> {
        let t = tables(target.kind);
        let sql = format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE value = 1) AS likes,
                COUNT(*) FILTER (WHERE value = -1) AS dislikes
            FROM {}
            WHERE {} = $1
            "#,
            t.reactions, t.target_column
        );

        let row = sqlx::query_as::<_, CountsRow>(&sql)
            .bind(target.id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(ReactionCounts {
            likes: row.likes,
            dislikes: row.dislikes,
        })
    }
}

fn not_found(target: ReactionTarget) -> DomainError {
    DomainError::NotFound(format!("{} id: {}", target.kind, target.id))
}
