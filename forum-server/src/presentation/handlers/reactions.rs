use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::reaction::{ReactionCounts, ReactionTarget, ReactionValue};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ReactionDto {
    /// 1 for like, -1 for dislike. Re-sending the current value clears it.
    pub(crate) value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReactionStateDto {
    None,
    Like,
    Dislike,
}

impl From<Option<ReactionValue>> for ReactionStateDto {
    fn from(value: Option<ReactionValue>) -> Self {
        match value {
            None => ReactionStateDto::None,
            Some(ReactionValue::Like) => ReactionStateDto::Like,
            Some(ReactionValue::Dislike) => ReactionStateDto::Dislike,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ReactionResponseDto {
    pub(crate) state: ReactionStateDto,
    pub(crate) likes: i64,
    pub(crate) dislikes: i64,
}

impl ReactionResponseDto {
    fn new(state: Option<ReactionValue>, counts: ReactionCounts) -> Self {
        Self {
            state: state.into(),
            likes: counts.likes,
            dislikes: counts.dislikes,
        }
    }
}

async fn toggle(
    state: &AppState,
    auth: AuthenticatedUser,
    target: ReactionTarget,
    dto: ReactionDto,
) -> AppResult<Json<ReactionResponseDto>> {
    let outcome = state
        .reaction_service
        .set_reaction(Some(auth.user_id), target, dto.value)
        .await?;
    Ok(Json(ReactionResponseDto::new(
        outcome.change.resulting(),
        outcome.counts,
    )))
}

async fn current(
    state: &AppState,
    auth: Option<AuthenticatedUser>,
    target: ReactionTarget,
) -> AppResult<Json<ReactionResponseDto>> {
    let (own, counts) = state
        .reaction_service
        .reaction_state(auth.map(|auth| auth.user_id), target)
        .await?;
    Ok(Json(ReactionResponseDto::new(own, counts)))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/reactions",
    tag = "reactions",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = ReactionDto,
    responses(
        (status = 200, description = "Reaction toggled", body = ReactionResponseDto),
        (status = 400, description = "Value must be 1 or -1"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn react_to_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<ReactionDto>,
) -> AppResult<Json<ReactionResponseDto>> {
    toggle(&state, auth, ReactionTarget::post(post_id), dto).await
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/reactions",
    tag = "reactions",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = ReactionDto,
    responses(
        (status = 200, description = "Reaction toggled", body = ReactionResponseDto),
        (status = 400, description = "Value must be 1 or -1"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn react_to_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(comment_id): Path<i64>,
    Json(dto): Json<ReactionDto>,
) -> AppResult<Json<ReactionResponseDto>> {
    toggle(&state, auth, ReactionTarget::comment(comment_id), dto).await
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/reactions",
    tag = "reactions",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Tallies and the caller's own vote", body = ReactionResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn post_reactions(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> AppResult<Json<ReactionResponseDto>> {
    current(&state, auth, ReactionTarget::post(post_id)).await
}

#[utoipa::path(
    get,
    path = "/api/comments/{id}/reactions",
    tag = "reactions",
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Tallies and the caller's own vote", body = ReactionResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn comment_reactions(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(comment_id): Path<i64>,
) -> AppResult<Json<ReactionResponseDto>> {
    current(&state, auth, ReactionTarget::comment(comment_id)).await
}
