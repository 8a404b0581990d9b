use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE user_info (
                user_id     INTEGER PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
                user_name   TEXT NOT NULL,
                user_tag    TEXT NOT NULL UNIQUE,
                theme       TEXT NOT NULL DEFAULT 'light',
                language    TEXT NOT NULL DEFAULT 'en',
                avatar_url  TEXT,
                description TEXT
            );

            CREATE TABLE user_tokens (
                token       TEXT PRIMARY KEY,
                user_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                expires_at  TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE posts (
                post_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                image_url   TEXT,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_posts_created ON posts(created_at, post_id);
            CREATE INDEX idx_posts_author ON posts(author_id, created_at);

            CREATE TABLE comments (
                comment_id  INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                post_id     INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
                comment     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_comments_post ON comments(post_id, created_at);

            CREATE TABLE tags (
                tag_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL UNIQUE
            );

            CREATE TABLE post_tags (
                post_id     INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
                tag_id      INTEGER NOT NULL REFERENCES tags(tag_id) ON DELETE CASCADE,
                PRIMARY KEY (post_id, tag_id)
            );

            CREATE TABLE likes (
                user_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                post_id     INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (user_id, post_id)
            );

            CREATE INDEX idx_likes_post ON likes(post_id);

            CREATE TABLE favorite_posts (
                user_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                post_id     INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (user_id, post_id)
            );

            CREATE TABLE follows (
                follower_id  INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                following_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (follower_id, following_id)
            );

            CREATE TABLE user_blocks (
                blocker_id  INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                blocked_id  INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (blocker_id, blocked_id)
            );

            CREATE TABLE notifications (
                notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                type_id         INTEGER NOT NULL,
                entity_id       INTEGER NOT NULL,
                is_read         INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_notifications_unread ON notifications(user_id, is_read);

            -- target_id points at a post or a comment depending on report_type_id
            CREATE TABLE reports (
                report_id       INTEGER PRIMARY KEY AUTOINCREMENT,
                reporter_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                target_id       INTEGER NOT NULL,
                report_type_id  INTEGER NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE VIEW view_post_summary AS
                SELECT p.post_id,
                       p.title,
                       p.description,
                       p.image_url,
                       p.created_at AS post_created_at,
                       p.author_id,
                       COALESCE(ui.user_name, '') AS author_user_name,
                       (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.post_id) AS like_count
                FROM posts p
                LEFT JOIN user_info ui ON ui.user_id = p.author_id;

            CREATE VIEW view_favorite_post_summary AS
                SELECT s.post_id,
                       s.title,
                       s.description,
                       s.image_url,
                       s.post_created_at,
                       s.author_id,
                       s.author_user_name,
                       s.like_count,
                       f.user_id AS favorited_by_user_id
                FROM view_post_summary s
                JOIN favorite_posts f ON f.post_id = s.post_id;

            CREATE VIEW view_comment_with_author_tag AS
                SELECT c.comment_id,
                       c.post_id,
                       c.comment,
                       c.created_at AS comment_created_at,
                       c.author_id,
                       COALESCE(ui.user_tag, '') AS author_user_tag
                FROM comments c
                LEFT JOIN user_info ui ON ui.user_id = c.author_id;

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
