use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::categories::list_categories;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}
