use std::sync::Arc;

use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::feed_service::FeedService;
use crate::application::post_service::PostService;
use crate::application::reaction_service::ReactionService;
use crate::application::session_service::SessionService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::feed_repository::PostgresFeedRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::reaction_repository::PostgresReactionRepository;
use crate::data::repositories::postgres::session_repository::PostgresSessionRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::settings::Settings;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type AppSessionService = SessionService<PostgresSessionRepository>;
pub(crate) type AppAuthService = AuthService<PostgresUserRepository, PostgresSessionRepository>;
pub(crate) type AppPostService =
    PostService<PostgresPostRepository, PostgresCommentRepository, PostgresCategoryRepository>;
pub(crate) type AppFeedService = FeedService<PostgresFeedRepository>;
pub(crate) type AppReactionService = ReactionService<PostgresReactionRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) sessions: Arc<AppSessionService>,
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) feed_service: Arc<AppFeedService>,
    pub(crate) reaction_service: Arc<AppReactionService>,
}

impl AppState {
    /// Wires every repository onto the shared pool.
    pub(crate) fn new(pool: PgPool, settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let sessions = Arc::new(SessionService::new(
            PostgresSessionRepository::new(pool.clone()),
            clock,
            settings.session_ttl_seconds,
        ));
        let auth_service = Arc::new(AuthService::new(
            PostgresUserRepository::new(pool.clone()),
            Arc::clone(&sessions),
        ));
        let post_service = Arc::new(PostService::new(
            PostgresPostRepository::new(pool.clone()),
            PostgresCommentRepository::new(pool.clone()),
            PostgresCategoryRepository::new(pool.clone()),
        ));
        let feed_service = Arc::new(FeedService::new(
            PostgresFeedRepository::new(pool.clone()),
            settings.feed_comment_limit,
        ));
        let reaction_service = Arc::new(ReactionService::new(PostgresReactionRepository::new(
            pool.clone(),
        )));

        Self {
            pool,
            sessions,
            auth_service,
            post_service,
            feed_service,
            reaction_service,
        }
    }
}
