use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::reactions::{comment_reactions, react_to_comment};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}/reactions",
        get(comment_reactions).post(react_to_comment),
    )
}
