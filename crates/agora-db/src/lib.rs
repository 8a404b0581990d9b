pub mod feed;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

const READER_POOL_SIZE: usize = 4;

/// Owns every connection to the store: one writer plus a round-robin set of
/// read-only connections. In-memory databases have no readers and serve reads
/// from the writer.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if path.as_os_str() == ":memory:" {
            return Self::open_in_memory();
        }

        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        info!("In-memory database opened");
        Ok(Self {
            writer: Mutex::new(conn),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| anyhow::anyhow!("Reader lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedScope;
    use crate::models::ProfileUpdate;
    use agora_types::page::PageWindow;
    use std::path::PathBuf;

    /// A database file under the temp dir, removed with its WAL files on drop.
    struct TempDb {
        path: PathBuf,
    }

    impl TempDb {
        fn new(name: &str) -> Self {
            let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            let path = std::env::temp_dir().join(format!(
                "agora-{}-{}-{}.db",
                name,
                std::process::id(),
                nanos
            ));
            Self { path }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(PathBuf::from(file));
            }
        }
    }

    #[test]
    fn file_backed_readers_see_writer_commits() {
        let tmp = TempDb::new("readers");
        let db = Database::open(&tmp.path).unwrap();
        assert_eq!(db.readers.len(), READER_POOL_SIZE);

        let ann = db
            .create_full_user("ann@example.com", "hash", "Ann", "ann")
            .unwrap();
        let posts: Vec<i64> = (1..=5)
            .map(|n| {
                let created_at = format!("2026-01-01T00:00:{n:02}.000Z");
                db.create_post(ann, &format!("post {n}"), "body", None, &created_at)
                    .unwrap()
            })
            .collect();

        let window = PageWindow::new(0, 2).unwrap();
        // every reader in the pool, not just the first
        for _ in 0..READER_POOL_SIZE {
            let (page, total) = db
                .read_feed(|feed| {
                    Ok((
                        feed.post_page(FeedScope::Author(ann), window)?,
                        feed.count_posts(FeedScope::Author(ann))?,
                    ))
                })
                .unwrap();
            let ids: Vec<i64> = page.iter().map(|p| p.post_id).collect();
            assert_eq!(ids, vec![posts[4], posts[3]]);
            assert!(window.has_more(total));
        }

        let update = ProfileUpdate {
            theme: Some("dark".into()),
            ..Default::default()
        };
        assert!(db.update_user_profile(ann, &update).unwrap());
        for _ in 0..READER_POOL_SIZE {
            let profile = db.get_user_profile(ann).unwrap().unwrap();
            assert_eq!(profile.user_tag, "ann");
            assert_eq!(profile.theme, "dark");
        }
    }

    #[test]
    fn readers_are_read_only() {
        let tmp = TempDb::new("readonly");
        let db = Database::open(&tmp.path).unwrap();

        let write = db.with_conn(|conn| {
            conn.execute("DELETE FROM users", [])?;
            Ok(())
        });
        assert!(write.is_err());
    }

    #[test]
    fn reopening_keeps_data() {
        let tmp = TempDb::new("reopen");
        let ann = {
            let db = Database::open(&tmp.path).unwrap();
            db.create_full_user("ann@example.com", "hash", "Ann", "ann")
                .unwrap()
        };

        let db = Database::open(&tmp.path).unwrap();
        assert!(db.user_exists(ann).unwrap());
    }
}
