use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::{auth, comments, feed, notifications, posts, reports, social, users};

/// Every route of the service, with uploads served under `/static`.
/// `upload_limit_bytes` caps request bodies (multipart posts and avatars).
pub fn router(state: AppState, upload_limit_bytes: usize) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/register", post(auth::register))
        .route("/auth", post(auth::login))
        .route("/auth/validate", post(auth::validate_token))
        .route("/users", get(users::get_user).patch(users::update_user))
        .route(
            "/posts",
            get(feed::get_posts)
                .post(posts::create_post)
                .delete(posts::delete_post),
        )
        .route(
            "/likes",
            post(social::add_like).delete(social::remove_like),
        )
        .route(
            "/comments",
            post(comments::add_comment).delete(comments::delete_comment),
        )
        .route(
            "/favorites",
            get(feed::get_favorites)
                .post(social::add_favorite)
                .delete(social::remove_favorite),
        )
        .route(
            "/follows",
            get(social::get_followings)
                .post(social::add_follow)
                .delete(social::remove_follow),
        )
        .route(
            "/blocks",
            get(social::check_block)
                .post(social::add_block)
                .delete(social::remove_block),
        )
        .route("/notifications", get(notifications::get_notifications))
        .route("/reports", post(reports::create_report))
        .route("/health", get(health))
        .nest_service("/static", media)
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "ok"
}
