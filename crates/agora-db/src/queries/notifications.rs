use anyhow::Result;
use rusqlite::Connection;

use crate::Database;
use crate::models::NotificationRow;

impl Database {
    /// Unread notifications for a user, newest first.
    pub fn unread_notifications(&self, user_id: i64) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| query_unread(conn, user_id))
    }

    /// Fetch the unread notifications and mark exactly those read, under one
    /// writer guard. Anything inserted afterwards stays unread.
    pub fn take_unread_notifications(&self, user_id: i64) -> Result<Vec<NotificationRow>> {
        self.with_conn_mut(|conn| {
            let rows = query_unread(conn, user_id)?;
            if let Some(max_id) = rows.iter().map(|n| n.notification_id).max() {
                mark_read(conn, user_id, max_id)?;
            }
            Ok(rows)
        })
    }
}

fn query_unread(conn: &Connection, user_id: i64) -> Result<Vec<NotificationRow>> {
    let mut stmt = conn.prepare(
        "SELECT notification_id, user_id, type_id, entity_id, is_read, created_at
         FROM notifications
         WHERE user_id = ?1 AND is_read = 0
         ORDER BY created_at DESC, notification_id DESC",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(NotificationRow {
                notification_id: row.get(0)?,
                user_id: row.get(1)?,
                type_id: row.get(2)?,
                entity_id: row.get(3)?,
                is_read: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Returns the number of notifications flipped to read.
fn mark_read(conn: &Connection, user_id: i64, up_to_id: i64) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1
         WHERE user_id = ?1 AND is_read = 0 AND notification_id <= ?2",
        [user_id, up_to_id],
    )?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, user};

    #[test]
    fn take_unread_marks_what_it_returns() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let cat = user(&db, "cat");
        db.add_follow(bob, ann).unwrap();
        db.add_follow(cat, ann).unwrap();

        let taken = db.take_unread_notifications(ann).unwrap();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].entity_id, cat);
        assert!(!taken[0].is_read);

        assert!(db.unread_notifications(ann).unwrap().is_empty());
        assert!(db.take_unread_notifications(ann).unwrap().is_empty());
    }

    #[test]
    fn notification_arriving_after_read_stays_unread() {
        let db = db();
        let ann = user(&db, "ann");
        let bob = user(&db, "bob");
        let cat = user(&db, "cat");
        db.add_follow(bob, ann).unwrap();

        let seen = db.unread_notifications(ann).unwrap();
        let max_seen = seen.iter().map(|n| n.notification_id).max().unwrap();

        // lands between the read and the mark
        db.add_follow(cat, ann).unwrap();

        let marked = db
            .with_conn_mut(|conn| super::mark_read(conn, ann, max_seen))
            .unwrap();
        assert_eq!(marked, 1);
        let unread = db.unread_notifications(ann).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].entity_id, cat);
    }
}
