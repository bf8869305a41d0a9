pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod feed_repository;
pub(crate) mod post_repository;
pub(crate) mod reaction_repository;
pub(crate) mod repositories;
pub(crate) mod session_repository;
pub(crate) mod user_repository;
