//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Missing rows surface as `Option`/`bool` outcomes, never as errors.
//! - Repositories refuse to operate on unmigrated connections.

pub mod session_repo;
pub mod task_repo;
