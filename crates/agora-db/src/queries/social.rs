use agora_types::models::{NotificationKind, ReportTarget};
use anyhow::Result;

use super::{OptionalExt, notify, now_timestamp};
use crate::Database;

impl Database {
    // -- Likes --

    /// Idempotent. Returns true when a new like was recorded.
    pub fn add_like(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                rusqlite::params![user_id, post_id, now_timestamp()],
            )?;
            if inserted == 0 {
                return Ok(false);
            }

            let post_author: Option<i64> = conn
                .query_row("SELECT author_id FROM posts WHERE post_id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if let Some(author) = post_author {
                notify(conn, author, user_id, NotificationKind::PostLike, post_id)?;
            }
            Ok(true)
        })
    }

    pub fn remove_like(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
                [user_id, post_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Favorites --

    pub fn add_favorite(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO favorite_posts (user_id, post_id, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                rusqlite::params![user_id, post_id, now_timestamp()],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn remove_favorite(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM favorite_posts WHERE user_id = ?1 AND post_id = ?2",
                [user_id, post_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Follows --

    /// Idempotent. A new follow notifies the followed user.
    pub fn add_follow(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                rusqlite::params![follower_id, following_id, now_timestamp()],
            )?;
            if inserted > 0 {
                notify(
                    conn,
                    following_id,
                    follower_id,
                    NotificationKind::NewFollower,
                    follower_id,
                )?;
            }
            Ok(inserted > 0)
        })
    }

    pub fn remove_follow(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                [follower_id, following_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Ids of every user `follower_id` follows.
    pub fn get_user_followings(&self, follower_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT following_id FROM follows WHERE follower_id = ?1 ORDER BY created_at, following_id",
            )?;
            let ids = stmt
                .query_map([follower_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }

    // -- Blocks --

    pub fn add_user_block(&self, blocker_id: i64, blocked_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO user_blocks (blocker_id, blocked_id, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                rusqlite::params![blocker_id, blocked_id, now_timestamp()],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn is_user_blocked(&self, blocker_id: i64, blocked_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let blocked = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM user_blocks WHERE blocker_id = ?1 AND blocked_id = ?2)",
                [blocker_id, blocked_id],
                |row| row.get(0),
            )?;
            Ok(blocked)
        })
    }

    pub fn remove_block(&self, blocker_id: i64, blocked_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM user_blocks WHERE blocker_id = ?1 AND blocked_id = ?2",
                [blocker_id, blocked_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Reports --

    pub fn create_report(&self, reporter_id: i64, target: ReportTarget, description: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let report_id = conn.query_row(
                "INSERT INTO reports (reporter_id, target_id, report_type_id, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING report_id",
                rusqlite::params![
                    reporter_id,
                    target.target_id(),
                    target.report_type_id(),
                    description,
                    now_timestamp()
                ],
                |row| row.get(0),
            )?;
            Ok(report_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use agora_types::models::ReportTarget;

    use crate::queries::test_support::{db, post_at, user};

    #[test]
    fn likes_are_idempotent_and_notify_once() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let post = post_at(&db, ann, "p", "2026-01-01T00:00:00.000Z");

        assert!(db.add_like(bob, post).unwrap());
        assert!(!db.add_like(bob, post).unwrap());
        assert_eq!(db.unread_notifications(ann).unwrap().len(), 1);

        assert!(db.add_like(ann, post).unwrap());
        assert_eq!(db.unread_notifications(ann).unwrap().len(), 1);

        assert!(db.remove_like(bob, post).unwrap());
        assert!(!db.remove_like(bob, post).unwrap());
    }

    #[test]
    fn follow_lifecycle() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let cat = user(&db, "cat");

        assert!(db.add_follow(ann, bob).unwrap());
        assert!(db.add_follow(ann, cat).unwrap());
        assert!(!db.add_follow(ann, bob).unwrap());
        assert_eq!(db.get_user_followings(ann).unwrap(), vec![bob, cat]);

        let unread = db.unread_notifications(bob).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].type_id, 1);
        assert_eq!(unread[0].entity_id, ann);

        assert!(db.remove_follow(ann, bob).unwrap());
        assert_eq!(db.get_user_followings(ann).unwrap(), vec![cat]);
        assert!(db.get_user_followings(bob).unwrap().is_empty());
    }

    #[test]
    fn block_lifecycle() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");

        assert!(!db.is_user_blocked(ann, bob).unwrap());
        assert!(db.add_user_block(ann, bob).unwrap());
        assert!(!db.add_user_block(ann, bob).unwrap());
        assert!(db.is_user_blocked(ann, bob).unwrap());
        assert!(!db.is_user_blocked(bob, ann).unwrap());

        assert!(db.remove_block(ann, bob).unwrap());
        assert!(!db.is_user_blocked(ann, bob).unwrap());
    }

    #[test]
    fn favorites_are_idempotent() {
        let db = db();
        let ann = user(&db, "ann");
        let post = post_at(&db, ann, "p", "2026-01-01T00:00:00.000Z");

        assert!(db.add_favorite(ann, post).unwrap());
        assert!(!db.add_favorite(ann, post).unwrap());
        assert!(db.remove_favorite(ann, post).unwrap());
        assert!(!db.remove_favorite(ann, post).unwrap());
    }

    #[test]
    fn reports_record_target_kind() {
        let db = db();
        let ann = user(&db, "ann");
        let id = db.create_report(ann, ReportTarget::Comment(7), "spam").unwrap();

        let (target, kind): (i64, i64) = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT target_id, report_type_id FROM reports WHERE report_id = ?1",
                    [id],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )?)
            })
            .unwrap();
        assert_eq!((target, kind), (7, 2));
    }
}
