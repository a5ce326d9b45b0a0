//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over persisted `tasks` documents.
//! - Keep SQL and JSON-column details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Per-user listings are returned in insertion order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{ChecklistItem, Task, TaskId, TaskValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    checklist,
    x,
    y,
    user_id
FROM tasks";

const TASK_COLUMNS: &[&str] = &[
    "uuid",
    "title",
    "checklist",
    "x",
    "y",
    "user_id",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task and session persistence.
#[derive(Debug)]
pub enum RepoError {
    /// A model invariant was violated before any write was attempted.
    Validation(TaskValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One typed field replacement for a partial task update.
///
/// `id` and `user_id` are immutable after creation and intentionally have
/// no variant here, so a merge can never overwrite them.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskField {
    /// Replace the title.
    Title(String),
    /// Replace the whole checklist value.
    Checklist(Vec<ChecklistItem>),
    /// Move the pin to a normalized position.
    Position { x: f64, y: f64 },
}

/// Repository interface for task document CRUD.
pub trait TaskRepository {
    /// Persists one validated task document.
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;

    /// Point lookup; `None` is a valid non-error outcome.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;

    /// Applies a typed partial merge: only the supplied fields change.
    ///
    /// Returns the merged document, or `None` when no document with that
    /// id exists (a non-error no-op). The merged document is re-validated
    /// before the write.
    fn update_task(&self, id: TaskId, fields: &[TaskField]) -> RepoResult<Option<Task>>;

    /// Deletes one document. Idempotent: a missing id returns `false`.
    fn remove_task(&self, id: TaskId) -> RepoResult<bool>;

    /// All tasks owned by `user_id`, in insertion order.
    fn list_tasks_by_user(&self, user_id: &str) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    ///
    /// # Errors
    /// Fails fast when migrations have not been applied, so no operation
    /// can be issued against unready storage.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (uuid, title, checklist, x, y, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                encode_checklist(&task.checklist)?,
                task.x,
                task.y,
                task.user_id.as_str(),
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn update_task(&self, id: TaskId, fields: &[TaskField]) -> RepoResult<Option<Task>> {
        let Some(mut task) = self.get_task(id)? else {
            return Ok(None);
        };

        for field in fields {
            match field {
                TaskField::Title(title) => task.title = title.clone(),
                TaskField::Checklist(checklist) => task.checklist = checklist.clone(),
                TaskField::Position { x, y } => {
                    task.x = *x;
                    task.y = *y;
                }
            }
        }
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?2,
                checklist = ?3,
                x = ?4,
                y = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                task.title.as_str(),
                encode_checklist(&task.checklist)?,
                task.x,
                task.y,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        Ok(Some(task))
    }

    fn remove_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn list_tasks_by_user(&self, user_id: &str) -> RepoResult<Vec<Task>> {
        // rowid breaks created_at ties from same-millisecond inserts.
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query([user_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

/// Verifies that a connection is migrated and carries the expected schema.
///
/// Shared by every repository in this crate; constructing a repository is
/// the readiness gate for issuing operations.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        let column_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM pragma_table_info(?1)
                WHERE name = ?2
            );",
            params![table, column],
            |row| row.get(0),
        )?;
        if column_exists == 0 {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let checklist_json: String = row.get("checklist")?;
    let checklist = decode_checklist(&checklist_json)?;

    let task = Task {
        id,
        title: row.get("title")?,
        checklist,
        x: row.get("x")?,
        y: row.get("y")?,
        user_id: row.get("user_id")?,
    };
    // Validation(..) is reserved for rejected writes; a row that is already
    // persisted in a bad state is an InvalidData read failure.
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("stored task violates model invariants: {err}"))
    })?;
    Ok(task)
}

fn encode_checklist(checklist: &[ChecklistItem]) -> RepoResult<String> {
    serde_json::to_string(checklist)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode checklist: {err}")))
}

fn decode_checklist(json: &str) -> RepoResult<Vec<ChecklistItem>> {
    serde_json::from_str(json).map_err(|err| {
        RepoError::InvalidData(format!("invalid checklist value in tasks.checklist: {err}"))
    })
}
