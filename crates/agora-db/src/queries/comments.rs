use agora_types::models::NotificationKind;
use anyhow::Result;

use super::{OptionalExt, notify, now_timestamp};
use crate::Database;
use crate::models::CommentRow;

impl Database {
    /// Store a comment and notify the post's author.
    /// Returns `None` when the post does not exist.
    pub fn add_comment(&self, author_id: i64, post_id: i64, text: &str) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            let post_author: Option<i64> = conn
                .query_row("SELECT author_id FROM posts WHERE post_id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(post_author) = post_author else {
                return Ok(None);
            };

            let comment = conn.query_row(
                "INSERT INTO comments (author_id, post_id, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING comment_id, author_id, post_id, comment, created_at",
                rusqlite::params![author_id, post_id, text, now_timestamp()],
                |row| {
                    Ok(CommentRow {
                        comment_id: row.get(0)?,
                        author_id: row.get(1)?,
                        post_id: row.get(2)?,
                        comment: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )?;

            notify(
                conn,
                post_author,
                author_id,
                NotificationKind::PostComment,
                comment.comment_id,
            )?;
            Ok(Some(comment))
        })
    }

    /// Delete a comment only if `user_id` wrote it.
    pub fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM comments WHERE comment_id = ?1 AND author_id = ?2",
                [comment_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }
}
