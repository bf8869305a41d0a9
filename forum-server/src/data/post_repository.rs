use async_trait::async_trait;

use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) category_ids: Vec<i64>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// Inserts the post together with all of its category links, or nothing.
    async fn create_post(&self, input: NewPost) -> Result<i64, DomainError>;
}
