use axum::Router;
use axum::middleware;

use super::AppState;
use super::middleware::auth::session_middleware;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/categories", categories::router())
        .nest("/api/posts", posts::router())
        .nest("/api/comments", comments::router())
        .layer(middleware::from_fn_with_state(state, session_middleware))
}
