//! Read primitives behind the post feed.
//!
//! A [`FeedReader`] borrows a single connection guard so that a whole page
//! (base rows, per-post comments and tags, total count) is read from one
//! connection without re-locking.

use agora_types::page::PageWindow;
use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

use crate::Database;
use crate::models::{CommentBriefRow, PostSummaryRow, TagRow};

/// Which posts a feed page draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    All,
    Author(i64),
    FavoritedBy(i64),
}

impl FeedScope {
    /// `FROM ... [WHERE ...]` fragment plus the value bound to `:filter`.
    fn source(self) -> (&'static str, Option<i64>) {
        match self {
            Self::All => ("FROM view_post_summary", None),
            Self::Author(id) => ("FROM view_post_summary WHERE author_id = :filter", Some(id)),
            Self::FavoritedBy(id) => (
                "FROM view_favorite_post_summary WHERE favorited_by_user_id = :filter",
                Some(id),
            ),
        }
    }
}

pub struct FeedReader<'c> {
    conn: &'c Connection,
}

impl Database {
    /// Run `f` with a feed reader bound to one read connection.
    pub fn read_feed<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&FeedReader<'_>) -> Result<T>,
    {
        self.with_conn(|conn| f(&FeedReader { conn }))
    }
}

impl FeedReader<'_> {
    /// Posts in `scope`, newest first, sliced by `window`.
    pub fn post_page(&self, scope: FeedScope, window: PageWindow) -> Result<Vec<PostSummaryRow>> {
        let (source, filter) = scope.source();
        let sql = format!(
            "SELECT post_id, title, description, image_url, post_created_at,
                    author_id, author_user_name, like_count
             {source}
             ORDER BY post_created_at DESC, post_id DESC
             LIMIT :limit OFFSET :offset"
        );

        let limit = window.amount();
        let offset = window.start_index();
        let mut params: Vec<(&str, &dyn ToSql)> = vec![
            (":limit", &limit as &dyn ToSql),
            (":offset", &offset as &dyn ToSql),
        ];
        if let Some(id) = filter.as_ref() {
            params.push((":filter", id as &dyn ToSql));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params.as_slice(), post_summary_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of posts in `scope`, ignoring any window.
    pub fn count_posts(&self, scope: FeedScope) -> Result<i64> {
        let (source, filter) = scope.source();
        let sql = format!("SELECT COUNT(*) {source}");

        let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();
        if let Some(id) = filter.as_ref() {
            params.push((":filter", id as &dyn ToSql));
        }

        let count = self
            .conn
            .query_row(&sql, params.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Comments on one post, oldest first.
    pub fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentBriefRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT comment_id, post_id, comment, comment_created_at, author_id, author_user_tag
             FROM view_comment_with_author_tag
             WHERE post_id = ?1
             ORDER BY comment_created_at ASC, comment_id ASC",
        )?;
        let rows = stmt
            .query_map([post_id], |row| {
                Ok(CommentBriefRow {
                    comment_id: row.get(0)?,
                    post_id: row.get(1)?,
                    comment: row.get(2)?,
                    created_at: row.get(3)?,
                    author_id: row.get(4)?,
                    author_tag: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Tags linked to one post, in no particular order.
    pub fn tags_for_post(&self, post_id: i64) -> Result<Vec<TagRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.tag_id, t.name
             FROM post_tags pt
             JOIN tags t ON t.tag_id = pt.tag_id
             WHERE pt.post_id = ?1",
        )?;
        let rows = stmt
            .query_map([post_id], |row| {
                Ok(TagRow {
                    tag_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn post_summary_from_row(row: &Row<'_>) -> rusqlite::Result<PostSummaryRow> {
    Ok(PostSummaryRow {
        post_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        author_id: row.get(5)?,
        author_name: row.get(6)?,
        like_count: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, post_at, user};

    fn ids(rows: &[PostSummaryRow]) -> Vec<i64> {
        rows.iter().map(|r| r.post_id).collect()
    }

    #[test]
    fn page_is_newest_first_and_filtered() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let a1 = post_at(&db, ann, "a1", "2026-01-01T00:00:01.000Z");
        let b1 = post_at(&db, bob, "b1", "2026-01-01T00:00:02.000Z");
        let a2 = post_at(&db, ann, "a2", "2026-01-01T00:00:03.000Z");

        let window = PageWindow::new(0, 10).unwrap();
        db.read_feed(|feed| {
            assert_eq!(ids(&feed.post_page(FeedScope::All, window)?), vec![a2, b1, a1]);
            assert_eq!(ids(&feed.post_page(FeedScope::Author(ann), window)?), vec![a2, a1]);
            assert_eq!(feed.count_posts(FeedScope::All)?, 3);
            assert_eq!(feed.count_posts(FeedScope::Author(bob))?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn equal_timestamps_fall_back_to_id_order() {
        let db = db();
        let ann = user(&db, "ann");
        let first = post_at(&db, ann, "x", "2026-01-01T00:00:00.000Z");
        let second = post_at(&db, ann, "y", "2026-01-01T00:00:00.000Z");

        let page = db
            .read_feed(|feed| feed.post_page(FeedScope::All, PageWindow::new(0, 5).unwrap()))
            .unwrap();
        assert_eq!(ids(&page), vec![second, first]);
    }

    #[test]
    fn summary_carries_author_name_and_like_count() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let post = post_at(&db, ann, "p", "2026-01-01T00:00:00.000Z");
        db.add_like(ann, post).unwrap();
        db.add_like(bob, post).unwrap();

        let page = db
            .read_feed(|feed| feed.post_page(FeedScope::All, PageWindow::new(0, 5).unwrap()))
            .unwrap();
        assert_eq!(page[0].author_name, "ann");
        assert_eq!(page[0].like_count, 2);
        assert!(page[0].image_url.is_none());
    }

    #[test]
    fn favorites_scope_reads_favorite_view() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let p1 = post_at(&db, ann, "p1", "2026-01-01T00:00:01.000Z");
        let _p2 = post_at(&db, ann, "p2", "2026-01-01T00:00:02.000Z");
        let p3 = post_at(&db, ann, "p3", "2026-01-01T00:00:03.000Z");
        db.add_favorite(bob, p1).unwrap();
        db.add_favorite(bob, p3).unwrap();

        db.read_feed(|feed| {
            let page = feed.post_page(FeedScope::FavoritedBy(bob), PageWindow::new(0, 10)?)?;
            assert_eq!(ids(&page), vec![p3, p1]);
            assert_eq!(feed.count_posts(FeedScope::FavoritedBy(bob))?, 2);
            assert_eq!(feed.count_posts(FeedScope::FavoritedBy(ann))?, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn comments_ascending_with_author_tag() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let post = post_at(&db, ann, "p", "2026-01-01T00:00:00.000Z");
        let c1 = db.add_comment(bob, post, "one").unwrap().unwrap();
        let c2 = db.add_comment(ann, post, "two").unwrap().unwrap();

        let comments = db.read_feed(|feed| feed.comments_for_post(post)).unwrap();
        let got: Vec<(i64, &str)> = comments
            .iter()
            .map(|c| (c.comment_id, c.author_tag.as_str()))
            .collect();
        assert_eq!(got, vec![(c1.comment_id, "bob"), (c2.comment_id, "ann")]);
    }
}
