//! Core domain logic for PlanPin.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod watch;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    default_checklist, ChecklistItem, ChecklistStatus, Task, TaskId, TaskValidationError,
    DEFAULT_POSITION,
};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskField, TaskRepository,
};
pub use service::session_service::{SessionError, SessionResult, SessionService, DEFAULT_USER};
pub use service::task_service::{TaskDraft, TaskService};
pub use watch::{TaskWatchers, WatchHandle};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
