use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::{CredentialRow, ProfileRow, ProfileUpdate};

const PROFILE_COLUMNS: &str =
    "user_id, user_name, user_tag, theme, language, avatar_url, description";

impl Database {
    pub fn is_user_tag_taken(&self, tag: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn
                .query_row("SELECT 1 FROM user_info WHERE user_tag = ?1 LIMIT 1", [tag], |_| Ok(()))
                .optional()?
                .is_some();
            Ok(taken)
        })
    }

    pub fn is_email_taken(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn
                .query_row("SELECT 1 FROM users WHERE email = ?1 LIMIT 1", [email], |_| Ok(()))
                .optional()?
                .is_some();
            Ok(taken)
        })
    }

    /// Insert the account and its profile together. Returns the new user id.
    pub fn create_full_user(
        &self,
        email: &str,
        password_hash: &str,
        user_name: &str,
        user_tag: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO users (email, password, created_at) VALUES (?1, ?2, ?3)",
                (email, password_hash, super::now_timestamp()),
            )?;
            let user_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO user_info (user_id, user_name, user_tag) VALUES (?1, ?2, ?3)",
                (user_id, user_name, user_tag),
            )?;
            tx.commit()?;
            Ok(user_id)
        })
    }

    pub fn save_user_token(&self, user_id: i64, token: &str, expires_at: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user_tokens (token, user_id, expires_at, created_at) VALUES (?1, ?2, ?3, ?4)",
                (token, user_id, expires_at, super::now_timestamp()),
            )?;
            Ok(())
        })
    }

    pub fn get_credentials_by_email(&self, email: &str) -> Result<Option<CredentialRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id, password FROM users WHERE email = ?1",
                [email],
                |row| {
                    Ok(CredentialRow {
                        user_id: row.get(0)?,
                        password: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn get_user_profile(&self, user_id: i64) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, "user_id = ?1", user_id))
    }

    pub fn user_exists(&self, user_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn
                .query_row("SELECT 1 FROM users WHERE user_id = ?1", [user_id], |_| Ok(()))
                .optional()?
                .is_some();
            Ok(exists)
        })
    }

    /// Apply a partial profile update. Returns false when the user has no
    /// profile row. An empty update touches nothing and reports true.
    pub fn update_user_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<bool> {
        let assignments = update.assignments();
        if assignments.is_empty() {
            return self.user_exists(user_id);
        }

        let set_clause: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE user_info SET {} WHERE user_id = ?{}",
            set_clause.join(", "),
            assignments.len() + 1
        );

        self.with_conn_mut(|conn| {
            let mut params: Vec<&dyn rusqlite::types::ToSql> = assignments
                .iter()
                .map(|(_, value)| value as &dyn rusqlite::types::ToSql)
                .collect();
            params.push(&user_id);

            let changed = conn.execute(&sql, params.as_slice())?;
            Ok(changed > 0)
        })
    }
}

fn query_profile<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    key: P,
) -> Result<Option<ProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_info WHERE {predicate}");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([key], profile_from_row).optional()
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        user_id: row.get(0)?,
        user_name: row.get(1)?,
        user_tag: row.get(2)?,
        theme: row.get(3)?,
        language: row.get(4)?,
        avatar_url: row.get(5)?,
        description: row.get(6)?,
    })
}
