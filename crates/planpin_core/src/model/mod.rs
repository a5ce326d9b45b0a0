//! Domain model for task pins and their checklists.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep checklist ownership inside the task document: items have no
//!   identity or lifecycle outside their task.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - A task's checklist is never empty.

pub mod task;
