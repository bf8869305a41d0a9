use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::data::session_repository::SessionRepository;
use crate::domain::error::DomainError;
use crate::domain::session::{Session, generate_token};
use crate::domain::validation::validate_positive_i64;
use crate::infrastructure::clock::Clock;

/// Issues and resolves login sessions.
///
/// Expiry is idle-style: `expires_at` is fixed when the session is created
/// and is never pushed back by later activity. Expired rows are removed
/// lazily, by the first resolution that notices them.
pub(crate) struct SessionService<R: SessionRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R: SessionRepository> SessionService<R> {
    pub(crate) const DEFAULT_TTL_SECONDS: i64 = 20 * 60;

    pub(crate) fn new(repo: R, clock: Arc<dyn Clock>, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        Self {
            repo,
            clock,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Starts a new session for `user_id`, invalidating any previous one.
    pub(crate) async fn create_session(&self, user_id: i64) -> Result<Session, DomainError> {
        validate_positive_i64("user_id", user_id)?;

        let session = Session {
            token: generate_token(),
            user_id,
            expires_at: self.clock.now() + self.ttl,
        };
        self.repo.replace_for_user(&session).await?;

        info!(user_id, expires_at = %session.expires_at, "session created");
        Ok(session)
    }

    /// Returns the user bound to `token`.
    ///
    /// Fails with `NotFound` for unknown tokens and with `SessionExpired` once
    /// the deadline has passed, in which case the row is deleted as well.
    pub(crate) async fn resolve(&self, token: &str) -> Result<i64, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::NotFound("session".to_string()));
        }

        let session = self
            .repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| DomainError::NotFound("session".to_string()))?;

        if session.is_expired_at(self.clock.now()) {
            self.repo.delete_by_token(token).await?;
            debug!(user_id = session.user_id, "expired session evicted");
            return Err(DomainError::SessionExpired);
        }

        Ok(session.user_id)
    }

    pub(crate) async fn destroy(&self, token: &str) -> Result<(), DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }
        if self.repo.delete_by_token(token).await? {
            info!("session destroyed");
        }
        Ok(())
    }
}
