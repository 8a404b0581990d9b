//! Paginated post feeds.
//!
//! A page is assembled in three steps: the window of post rows (newest
//! first), then one comments query and one tags query per post in that
//! window, then a total count under the same scope to derive `hasMore`.
//! Any failure along the way fails the whole page.

use agora_db::Database;
use agora_db::feed::{FeedReader, FeedScope};
use agora_db::models::{CommentBriefRow, PostSummaryRow, TagRow};
use agora_types::api::{FavoritesQuery, FeedResponse, PostsQuery};
use agora_types::page::PageWindow;
use anyhow::Result;
use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::convert;
use crate::error::ApiError;
use crate::extract::QueryParams;
use crate::state::{AppState, run_db};

/// Read side the assembler needs from the store.
pub trait FeedSource {
    fn post_page(&self, scope: FeedScope, window: PageWindow) -> Result<Vec<PostSummaryRow>>;
    fn count_posts(&self, scope: FeedScope) -> Result<i64>;
    fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentBriefRow>>;
    fn tags_for_post(&self, post_id: i64) -> Result<Vec<TagRow>>;
}

impl FeedSource for FeedReader<'_> {
    fn post_page(&self, scope: FeedScope, window: PageWindow) -> Result<Vec<PostSummaryRow>> {
        FeedReader::post_page(self, scope, window)
    }

    fn count_posts(&self, scope: FeedScope) -> Result<i64> {
        FeedReader::count_posts(self, scope)
    }

    fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentBriefRow>> {
        FeedReader::comments_for_post(self, post_id)
    }

    fn tags_for_post(&self, post_id: i64) -> Result<Vec<TagRow>> {
        FeedReader::tags_for_post(self, post_id)
    }
}

/// Build one hydrated page. Posts keep the order the source returned them in.
pub fn assemble<S: FeedSource + ?Sized>(
    source: &S,
    scope: FeedScope,
    window: PageWindow,
) -> Result<FeedResponse> {
    let rows = source.post_page(scope, window)?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        let comments = source
            .comments_for_post(row.post_id)?
            .into_iter()
            .map(convert::comment_brief)
            .collect();
        let tags = source
            .tags_for_post(row.post_id)?
            .into_iter()
            .map(convert::tag_brief)
            .collect();
        posts.push(convert::post_summary(row, comments, tags));
    }

    let total = source.count_posts(scope)?;

    Ok(FeedResponse {
        posts,
        has_more: window.has_more(total),
    })
}

/// Newest posts overall, or only those by `author_id`.
pub fn list_posts(db: &Database, author_id: Option<i64>, window: PageWindow) -> Result<FeedResponse> {
    let scope = author_id.map_or(FeedScope::All, FeedScope::Author);
    db.read_feed(|feed| assemble(feed, scope, window))
}

/// Newest posts favorited by `user_id`.
pub fn list_favorites(db: &Database, user_id: i64, window: PageWindow) -> Result<FeedResponse> {
    db.read_feed(|feed| assemble(feed, FeedScope::FavoritedBy(user_id), window))
}

/// GET /posts?startIndex&amount[&userId]
pub async fn get_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let window = PageWindow::new(query.start_index, query.amount)?;
    let author_id = query.user_id;
    debug!(
        "Fetching posts: startIndex={}, amount={}, userId={:?}",
        window.start_index(),
        window.amount(),
        author_id
    );

    let page = run_db(&state, move |s| Ok(list_posts(&s.db, author_id, window)?)).await?;
    Ok(Json(page))
}

/// GET /favorites?startIndex&amount&userId
pub async fn get_favorites(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FavoritesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let window = PageWindow::new(query.start_index, query.amount)?;
    let user_id = query.user_id;
    debug!(
        "Fetching favorites: startIndex={}, amount={}, userId={}",
        window.start_index(),
        window.amount(),
        user_id
    );

    let page = run_db(&state, move |s| Ok(list_favorites(&s.db, user_id, window)?)).await?;
    Ok(Json(page))
}
