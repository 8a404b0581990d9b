mod comments;
mod notifications;
mod posts;
mod social;
mod users;

use agora_types::models::NotificationKind;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

/// Current time in the stored timestamp format (RFC 3339, UTC, milliseconds),
/// which sorts lexically in chronological order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Record a notification for `user_id` unless the actor is that same user.
fn notify(
    conn: &Connection,
    user_id: i64,
    actor_id: i64,
    kind: NotificationKind,
    entity_id: i64,
) -> Result<()> {
    if user_id == actor_id {
        return Ok(());
    }
    conn.execute(
        "INSERT INTO notifications (user_id, type_id, entity_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, kind.type_id(), entity_id, now_timestamp()],
    )?;
    Ok(())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Database;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn user(db: &Database, tag: &str) -> i64 {
        db.create_full_user(&format!("{tag}@example.com"), "hash", tag, tag)
            .unwrap()
    }

    pub fn post_at(db: &Database, author_id: i64, title: &str, created_at: &str) -> i64 {
        db.create_post(author_id, title, "body", None, created_at)
            .unwrap()
    }
}
