pub(crate) mod auth_service;
pub(crate) mod feed_service;
pub(crate) mod post_service;
pub(crate) mod reaction_service;
pub(crate) mod session_service;
