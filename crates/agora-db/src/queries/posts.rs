use anyhow::Result;

use crate::Database;
use crate::models::TagRow;

impl Database {
    /// Insert a post and return its id.
    pub fn create_post(
        &self,
        author_id: i64,
        title: &str,
        description: &str,
        image_url: Option<&str>,
        created_at: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let post_id = conn.query_row(
                "INSERT INTO posts (author_id, title, description, image_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING post_id",
                rusqlite::params![author_id, title, description, image_url, created_at],
                |row| row.get(0),
            )?;
            Ok(post_id)
        })
    }

    /// Hard delete; likes, comments, tag links and favorites cascade.
    /// Returns false when no such post existed.
    pub fn delete_post(&self, post_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM posts WHERE post_id = ?1", [post_id])?;
            Ok(deleted > 0)
        })
    }

    /// Look a tag up by name, creating it on first use.
    ///
    /// The insert is conflict-tolerant against the `name` unique constraint,
    /// so two callers racing on a new name both end up with the same id.
    pub fn get_or_create_tag(&self, name: &str) -> Result<TagRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO tags (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                [name],
            )?;
            let tag = conn.query_row(
                "SELECT tag_id, name FROM tags WHERE name = ?1",
                [name],
                |row| {
                    Ok(TagRow {
                        tag_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )?;
            Ok(tag)
        })
    }

    pub fn add_post_tag(&self, post_id: i64, tag_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO post_tags (post_id, tag_id) VALUES (?1, ?2)",
                [post_id, tag_id],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, post_at, user};

    #[test]
    fn get_or_create_tag_reuses_existing_name() {
        let db = db();
        let first = db.get_or_create_tag("rust").unwrap();
        let second = db.get_or_create_tag("rust").unwrap();
        let other = db.get_or_create_tag("sqlite").unwrap();

        assert_eq!(first.tag_id, second.tag_id);
        assert_ne!(first.tag_id, other.tag_id);
        assert_eq!(second.name, "rust");
    }

    #[test]
    fn duplicate_tag_link_is_rejected() {
        let db = db();
        let author = user(&db, "ann");
        let post = post_at(&db, author, "p", "2026-01-01T00:00:00.000Z");
        let tag = db.get_or_create_tag("rust").unwrap();

        db.add_post_tag(post, tag.tag_id).unwrap();
        assert!(db.add_post_tag(post, tag.tag_id).is_err());
    }

    #[test]
    fn delete_post_cascades() {
        let db = db();
        let author = user(&db, "ann");
        let fan = user(&db, "bob");
        let post = post_at(&db, author, "p", "2026-01-01T00:00:00.000Z");
        let tag = db.get_or_create_tag("rust").unwrap();
        db.add_post_tag(post, tag.tag_id).unwrap();
        db.add_like(fan, post).unwrap();
        db.add_comment(fan, post, "nice").unwrap();

        assert!(db.delete_post(post).unwrap());
        assert!(!db.delete_post(post).unwrap());

        let leftovers: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT (SELECT COUNT(*) FROM posts) + (SELECT COUNT(*) FROM likes)
                          + (SELECT COUNT(*) FROM comments) + (SELECT COUNT(*) FROM post_tags)",
                    [],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(leftovers, 0);
    }
}
