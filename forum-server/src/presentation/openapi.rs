use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{LoginDto, LoginResponseDto, RegisterDto, UserDto};
use crate::presentation::handlers::categories::CategoryDto;
use crate::presentation::handlers::comments::{CommentDto, CreateCommentDto};
use crate::presentation::handlers::posts::{
    CommentDetailDto, CommentPreviewDto, CreatePostDto, CreatedPostDto, FeedResponseDto,
    PostCardDto, PostDetailDto, PostSummaryDto,
};
use crate::presentation::handlers::reactions::{
    ReactionDto, ReactionResponseDto, ReactionStateDto,
};
use crate::presentation::middleware::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::me,
        crate::presentation::handlers::categories::list_categories,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::reactions::react_to_post,
        crate::presentation::handlers::reactions::react_to_comment,
        crate::presentation::handlers::reactions::post_reactions,
        crate::presentation::handlers::reactions::comment_reactions
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            LoginResponseDto,
            UserDto,
            CategoryDto,
            CreatePostDto,
            CreatedPostDto,
            PostSummaryDto,
            CommentPreviewDto,
            PostCardDto,
            FeedResponseDto,
            CommentDetailDto,
            PostDetailDto,
            CreateCommentDto,
            CommentDto,
            ReactionDto,
            ReactionStateDto,
            ReactionResponseDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "categories", description = "Post categories"),
        (name = "posts", description = "Feed, post detail and post creation"),
        (name = "comments", description = "Comments on posts"),
        (name = "reactions", description = "Like/dislike toggles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("session token")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        openapi.components = Some(components);
    }
}
