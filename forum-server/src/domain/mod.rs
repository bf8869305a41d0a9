pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod detail;
pub(crate) mod error;
pub(crate) mod feed;
pub(crate) mod post;
pub(crate) mod reaction;
pub(crate) mod session;
pub(crate) mod user;
pub(crate) mod validation;
