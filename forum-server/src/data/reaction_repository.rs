use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::reaction::{ReactionChange, ReactionCounts, ReactionTarget, ReactionValue};

#[async_trait]
pub(crate) trait ReactionRepository: Send + Sync {
    /// Applies the tri-state toggle for (user, target) atomically.
    ///
    /// Fails with `NotFound` when the target is missing and with `Conflict`
    /// when a concurrent insert for the same pair won the race.
    async fn apply_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
        requested: ReactionValue,
    ) -> Result<ReactionChange, DomainError>;

    async fn find_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
    ) -> Result<Option<ReactionValue>, DomainError>;

    async fn reaction_counts(&self, target: ReactionTarget) -> Result<ReactionCounts, DomainError>;
}
