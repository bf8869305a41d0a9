use tracing::warn;

use crate::data::reaction_repository::ReactionRepository;
use crate::domain::error::DomainError;
use crate::domain::reaction::{ReactionCounts, ReactionOutcome, ReactionTarget, ReactionValue};

pub(crate) struct ReactionService<R: ReactionRepository> {
    repo: R,
}

impl<R: ReactionRepository> ReactionService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Toggles the caller's vote on a post or comment.
    ///
    /// Re-sending the current vote clears it, sending the opposite vote flips
    /// it. A lost insert race is retried once against the row that won.
    pub(crate) async fn set_reaction(
        &self,
        actor_id: Option<i64>,
        target: ReactionTarget,
        value: i64,
    ) -> Result<ReactionOutcome, DomainError> {
        let user_id = actor_id.ok_or(DomainError::Unauthorized)?;
        let target = target.validate()?;
        let requested = ReactionValue::from_i64(value)?;

        let change = match self.repo.apply_reaction(user_id, target, requested).await {
            Err(DomainError::Conflict(reason)) => {
                warn!(
                    user_id,
                    target_kind = %target.kind,
                    target_id = target.id,
                    %reason,
                    "concurrent reaction insert, retrying"
                );
                self.repo.apply_reaction(user_id, target, requested).await?
            }
            result => result?,
        };

        let counts = self.repo.reaction_counts(target).await?;
        Ok(ReactionOutcome {
            change,
            counts,
        })
    }

    /// Current tallies for `target` plus the viewer's own vote, if any.
    pub(crate) async fn reaction_state(
        &self,
        viewer_id: Option<i64>,
        target: ReactionTarget,
    ) -> Result<(Option<ReactionValue>, ReactionCounts), DomainError> {
        let target = target.validate()?;
        let own = match viewer_id {
            Some(user_id) => self.repo.find_reaction(user_id, target).await?,
            None => None,
        };
        let counts = self.repo.reaction_counts(target).await?;
        Ok((own, counts))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::ReactionService;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::reaction_repository::ReactionRepository;
    use crate::data::repositories::memory::InMemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::reaction::{ReactionChange, ReactionTarget, ReactionValue};

    struct Fixture {
        store: InMemoryStore,
        service: ReactionService<InMemoryStore>,
        author: i64,
        post_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let author = store.add_user("author");
        let math = store.add_category("Math");
        let post_id = store
            .create_post(NewPost {
                author_id: author,
                title: "Primes".to_string(),
                body: "There are infinitely many.".to_string(),
                category_ids: vec![math],
            })
            .await
            .expect("post must be created");

        Fixture {
            service: ReactionService::new(store.clone()),
            store,
            author,
            post_id,
        }
    }

    #[tokio::test]
    async fn like_unlike_dislike_scenario() {
        let f = fixture().await;
        let voter = f.store.add_user("voter");
        let target = ReactionTarget::post(f.post_id);

        let outcome = f
            .service
            .set_reaction(Some(voter), target, 1)
            .await
            .expect("like");
        assert_eq!(outcome.change, ReactionChange::Inserted(ReactionValue::Like));
        assert_eq!(outcome.counts.likes, 1);

        let outcome = f
            .service
            .set_reaction(Some(voter), target, 1)
            .await
            .expect("unlike");
        assert_eq!(outcome.change, ReactionChange::Removed);
        assert_eq!(outcome.counts.likes, 0);

        let outcome = f
            .service
            .set_reaction(Some(voter), target, -1)
            .await
            .expect("dislike");
        assert_eq!(outcome.counts.dislikes, 1);
        assert_eq!(outcome.counts.likes, 0);
    }

    #[tokio::test]
    async fn repeating_a_vote_leaves_no_row() {
        let f = fixture().await;
        let target = ReactionTarget::post(f.post_id);

        for _ in 0..2 {
            f.service
                .set_reaction(Some(f.author), target, 1)
                .await
                .expect("vote");
        }

        assert_eq!(f.store.reaction_rows(f.author, target), 0);
        let (own, counts) = f
            .service
            .reaction_state(Some(f.author), target)
            .await
            .expect("lookup");
        assert_eq!(own, None);
        assert_eq!(counts.likes, 0);
    }

    #[tokio::test]
    async fn flipping_keeps_exactly_one_row() {
        let f = fixture().await;
        let target = ReactionTarget::post(f.post_id);

        f.service
            .set_reaction(Some(f.author), target, 1)
            .await
            .expect("like");
        let outcome = f
            .service
            .set_reaction(Some(f.author), target, -1)
            .await
            .expect("flip");

        assert_eq!(outcome.change, ReactionChange::Flipped(ReactionValue::Dislike));
        assert_eq!(f.store.reaction_rows(f.author, target), 1);
        let (own, counts) = f
            .service
            .reaction_state(Some(f.author), target)
            .await
            .expect("lookup");
        assert_eq!(own, Some(ReactionValue::Dislike));
        assert_eq!(counts.dislikes, 1);

        let (anonymous, _) = f
            .service
            .reaction_state(None, target)
            .await
            .expect("anonymous lookup");
        assert_eq!(anonymous, None);
    }

    #[tokio::test]
    async fn comments_use_the_same_toggle() {
        let f = fixture().await;
        let comment = f
            .store
            .create_comment(NewComment {
                post_id: f.post_id,
                author_id: f.author,
                body: "first".to_string(),
            })
            .await
            .expect("comment must be created");
        let target = ReactionTarget::comment(comment.id);

        let outcome = f
            .service
            .set_reaction(Some(f.author), target, -1)
            .await
            .expect("dislike comment");
        assert_eq!(outcome.counts.dislikes, 1);

        let outcome = f
            .service
            .set_reaction(Some(f.author), target, 1)
            .await
            .expect("flip comment");
        assert_eq!(outcome.counts.likes, 1);
        assert_eq!(outcome.counts.dislikes, 0);

        let post_counts = f
            .store
            .reaction_counts(ReactionTarget::post(f.post_id))
            .await
            .expect("post counts");
        assert_eq!(post_counts.likes + post_counts.dislikes, 0);
    }

    #[tokio::test]
    async fn anonymous_caller_is_unauthorized() {
        let f = fixture().await;
        let err = f
            .service
            .set_reaction(None, ReactionTarget::post(f.post_id), 1)
            .await
            .expect_err("anonymous vote must fail");
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn values_other_than_unit_votes_are_rejected() {
        let f = fixture().await;
        for value in [0, 2, -5] {
            let err = f
                .service
                .set_reaction(Some(f.author), ReactionTarget::post(f.post_id), value)
                .await
                .expect_err("invalid value");
            assert!(matches!(err, DomainError::Validation { field: "value", .. }));
        }
        assert_eq!(f.store.reaction_rows(f.author, ReactionTarget::post(f.post_id)), 0);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let f = fixture().await;
        for target in [ReactionTarget::post(9_999), ReactionTarget::comment(9_999)] {
            let err = f
                .service
                .set_reaction(Some(f.author), target, 1)
                .await
                .expect_err("target must be missing");
            assert!(matches!(err, DomainError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn lost_insert_race_is_retried_against_the_winning_row() {
        let f = fixture().await;
        let target = ReactionTarget::post(f.post_id);
        f.store.race_next_insert(f.author, target, ReactionValue::Dislike);

        let outcome = f
            .service
            .set_reaction(Some(f.author), target, 1)
            .await
            .expect("retry must succeed");

        assert_eq!(outcome.change, ReactionChange::Flipped(ReactionValue::Like));
        assert_eq!(f.store.reaction_rows(f.author, target), 1);
        assert_eq!(outcome.counts.likes, 1);
        assert_eq!(outcome.counts.dislikes, 0);
    }

    #[tokio::test]
    async fn random_sequences_keep_one_row_per_user_and_consistent_counts() {
        let f = fixture().await;
        let comment = f
            .store
            .create_comment(NewComment {
                post_id: f.post_id,
                author_id: f.author,
                body: "c".to_string(),
            })
            .await
            .expect("comment");
        let targets = [ReactionTarget::post(f.post_id), ReactionTarget::comment(comment.id)];
        let users: Vec<i64> = (0..4)
            .map(|n| f.store.add_user(&format!("user{n}")))
            .collect();

        let mut expected: HashMap<(i64, ReactionTarget), ReactionValue> = HashMap::new();
        for _ in 0..300 {
            let user = users[rand::random::<u32>() as usize % users.len()];
            let target = targets[rand::random::<u32>() as usize % targets.len()];
            let value = if rand::random::<bool>() { 1 } else { -1 };

            let outcome = f
                .service
                .set_reaction(Some(user), target, value)
                .await
                .expect("vote must apply");

            match outcome.change.resulting() {
                Some(state) => expected.insert((user, target), state),
                None => expected.remove(&(user, target)),
            };

            for user in &users {
                assert!(f.store.reaction_rows(*user, target) <= 1);
            }
            let non_neutral = expected.keys().filter(|(_, t)| *t == target).count() as i64;
            assert_eq!(outcome.counts.likes + outcome.counts.dislikes, non_neutral);
        }
    }
}
