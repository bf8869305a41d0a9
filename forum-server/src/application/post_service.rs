use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::category::Category;
use crate::domain::comment::{Comment, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::post::CreatePostRequest;
use crate::domain::validation::validate_positive_i64;

/// Write side of the forum: new posts, new comments and the category list
/// posts are filed under.
pub(crate) struct PostService<P, C, K>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
{
    posts: P,
    comments: C,
    categories: K,
}

impl<P, C, K> PostService<P, C, K>
where
    P: PostRepository,
    C: CommentRepository,
    K: CategoryRepository,
{
    pub(crate) fn new(posts: P, comments: C, categories: K) -> Self {
        Self {
            posts,
            comments,
            categories,
        }
    }

    pub(crate) async fn create_post(
        &self,
        actor_id: Option<i64>,
        req: CreatePostRequest,
    ) -> Result<i64, DomainError> {
        let author_id = actor_id.ok_or(DomainError::Unauthorized)?;
        let req = req.validate()?;

        let new_post = NewPost {
            author_id,
            title: req.title,
            body: req.body,
            category_ids: req.category_ids,
        };
        self.posts.create_post(new_post).await
    }

    pub(crate) async fn create_comment(
        &self,
        actor_id: Option<i64>,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let author_id = actor_id.ok_or(DomainError::Unauthorized)?;
        validate_positive_i64("post_id", post_id)?;
        let req = req.validate()?;

        self.comments
            .create_comment(NewComment {
                post_id,
                author_id,
                body: req.body,
            })
            .await
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_categories().await
    }
}
