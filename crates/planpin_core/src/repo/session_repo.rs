//! Session repository for the locally persisted login name.
//!
//! # Responsibility
//! - Store and clear the current user name in the `session` key/value table.
//!
//! # Invariants
//! - At most one current user exists; saving replaces the previous value.
//! - A missing session row reads as `None`, never as an error.

use crate::repo::task_repo::{ensure_connection_ready, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key under which the logged-in user name is stored.
const CURRENT_USER_KEY: &str = "user";

const SESSION_COLUMNS: &[&str] = &["key", "value"];

/// Repository interface for the single-entry login session.
pub trait SessionRepository {
    /// Returns the persisted user name, if a session exists.
    fn load_current_user(&self) -> RepoResult<Option<String>>;

    /// Persists `name` as the current user, replacing any previous session.
    fn save_current_user(&self, name: &str) -> RepoResult<()>;

    /// Removes the persisted session. Idempotent.
    fn clear_current_user(&self) -> RepoResult<()>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "session", SESSION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn load_current_user(&self) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1;",
                [CURRENT_USER_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_current_user(&self, name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO session (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![CURRENT_USER_KEY, name],
        )?;
        Ok(())
    }

    fn clear_current_user(&self) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM session WHERE key = ?1;", [CURRENT_USER_KEY])?;
        Ok(())
    }
}
