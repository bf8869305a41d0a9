use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::create_comment;
use crate::presentation::handlers::posts::{create_post, get_post, list_posts};
use crate::presentation::handlers::reactions::{post_reactions, react_to_post};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post))
        .route("/{id}/comments", post(create_comment))
        .route("/{id}/reactions", get(post_reactions).post(react_to_post))
}
