use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::session::Session;

#[async_trait]
pub(crate) trait SessionRepository: Send + Sync {
    /// Removes every session of `session.user_id` and stores `session`, as one
    /// transaction. Fails with `NotFound` when the user does not exist.
    async fn replace_for_user(&self, session: &Session) -> Result<(), DomainError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError>;
    /// Returns whether a row was removed; removing a missing token is not an error.
    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError>;
}
