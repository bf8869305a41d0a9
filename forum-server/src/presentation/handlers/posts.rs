use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::detail::{CommentDetail, PostDetail};
use crate::domain::feed::{CommentPreview, FeedSelection, PostCard, PostSummary};
use crate::domain::post::CreatePostRequest;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 10000))]
    pub(crate) body: String,
    #[validate(length(min = 1))]
    pub(crate) category_ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CreatedPostDto {
    pub(crate) id: i64,
}

/// Feed selection. When several are given, `liked` wins over `mine`, which
/// wins over `category_id`.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub(crate) struct FeedQuery {
    /// `1` or `true`: only the caller's own posts.
    pub(crate) mine: Option<String>,
    /// `1` or `true`: only posts the caller liked.
    pub(crate) liked: Option<String>,
    /// Only posts filed under this category.
    pub(crate) category_id: Option<i64>,
}

impl From<FeedQuery> for FeedSelection {
    fn from(query: FeedQuery) -> Self {
        FeedSelection {
            mine_only: is_set(query.mine.as_deref()),
            liked_only: is_set(query.liked.as_deref()),
            category_id: query.category_id,
        }
        .with_precedence()
    }
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag.map(str::trim), Some("1" | "true"))
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostSummaryDto {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) title: String,
    pub(crate) body: String,
    /// Category names joined with ", ".
    pub(crate) categories: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) likes: i64,
    pub(crate) dislikes: i64,
}

impl From<PostSummary> for PostSummaryDto {
    fn from(post: PostSummary) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_name: post.author_name,
            title: post.title,
            body: post.body,
            categories: post.category_names,
            created_at: post.created_at,
            likes: post.reactions.likes,
            dislikes: post.reactions.dislikes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentPreviewDto {
    pub(crate) author_name: String,
    pub(crate) body: String,
}

impl From<CommentPreview> for CommentPreviewDto {
    fn from(comment: CommentPreview) -> Self {
        Self {
            author_name: comment.author_name,
            body: comment.body,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostCardDto {
    pub(crate) post: PostSummaryDto,
    /// Newest comments first.
    pub(crate) comments: Vec<CommentPreviewDto>,
}

impl From<PostCard> for PostCardDto {
    fn from(card: PostCard) -> Self {
        Self {
            post: card.post.into(),
            comments: card.comments.into_iter().map(CommentPreviewDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FeedResponseDto {
    pub(crate) posts: Vec<PostCardDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDetailDto {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) likes: i64,
    pub(crate) dislikes: i64,
}

impl From<CommentDetail> for CommentDetailDto {
    fn from(comment: CommentDetail) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            author_name: comment.author_name,
            body: comment.body,
            created_at: comment.created_at,
            likes: comment.reactions.likes,
            dislikes: comment.reactions.dislikes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostSummaryDto,
    /// Oldest comments first.
    pub(crate) comments: Vec<CommentDetailDto>,
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail
                .comments
                .into_iter()
                .map(CommentDetailDto::from)
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(FeedQuery),
    responses(
        (status = 200, description = "Newest posts first with their latest comments", body = FeedResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "mine/liked without a session"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponseDto>> {
    let cards = state
        .feed_service
        .list_posts(query.into(), auth.map(|auth| auth.user_id))
        .await?;

    Ok(Json(FeedResponseDto {
        posts: cards.into_iter().map(PostCardDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with all comments", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    let detail = state.feed_service.get_post_detail(id).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = CreatedPostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown category"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<CreatedPostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        body: dto.body,
        category_ids: dto.category_ids,
    };

    let id = state
        .post_service
        .create_post(Some(auth.user_id), req)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedPostDto { id })))
}
