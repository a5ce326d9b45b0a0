//! Task domain model.
//!
//! # Responsibility
//! - Define the task document: title, owner, normalized plan position and
//!   the ordered checklist it owns.
//! - Provide checklist edit helpers that preserve model invariants.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `user_id` is fixed at creation and only ever used as a query filter.
//! - `checklist` keeps insertion order and never becomes empty.
//! - `x`/`y` are finite and stay inside the normalized [0.0, 1.0] frame.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task pinned to the plan.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Normalized position used when no explicit pin location is supplied:
/// the center of the plan image.
pub const DEFAULT_POSITION: (f64, f64) = (0.5, 0.5);

/// Lifecycle state of one checklist item.
///
/// The state machine is intentionally free-form: any value may follow any
/// other, the editor offers the full set at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    /// Created but not started.
    NotStarted,
    /// Work is in progress.
    InProgress,
    /// Waiting on something external.
    Blocked,
    /// Done on site, awaiting the final inspection.
    FinalCheck,
    /// Completed and signed off.
    Done,
}

impl ChecklistStatus {
    /// All states in the order the editor presents them.
    pub const ALL: [ChecklistStatus; 5] = [
        ChecklistStatus::NotStarted,
        ChecklistStatus::InProgress,
        ChecklistStatus::Blocked,
        ChecklistStatus::FinalCheck,
        ChecklistStatus::Done,
    ];

    /// Display label shown next to a checklist item.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Blocked => "Blocked",
            Self::FinalCheck => "Final Check awaiting",
            Self::Done => "Done",
        }
    }
}

/// One unit of work inside a task's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique within the owning checklist, immutable after creation.
    pub id: String,
    /// Free-form description. May stay empty while the user is editing.
    pub text: String,
    /// Current lifecycle state.
    pub status: ChecklistStatus,
}

impl ChecklistItem {
    /// Creates an item with a fresh random id and `NotStarted` status.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), text)
    }

    /// Creates an item with a caller-provided id.
    ///
    /// Used by seed checklists and import paths where identity already
    /// exists externally. The id must remain stable for the item lifetime.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: ChecklistStatus::NotStarted,
        }
    }
}

/// Seed checklist attached to tasks created without an explicit one.
///
/// Mirrors the standard site workflow: preparation, materials, execution,
/// final inspection.
pub fn default_checklist() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::with_id("1", "Vorbereitung / Preparation"),
        ChecklistItem::with_id("2", "Material prüfen / Check materials"),
        ChecklistItem::with_id("3", "Ausführung / Execution"),
        ChecklistItem::with_id("4", "Abschlusskontrolle / Final inspection"),
    ]
}

/// A unit of work pinned to the floor plan.
///
/// The checklist is a value fully contained in the task document; mutating
/// any item means rewriting the whole checklist as one persisted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for lookups and live-query snapshots.
    pub id: TaskId,
    /// Short description shown on the marker. Non-empty after validation.
    pub title: String,
    /// Ordered work items. Never empty for a persisted task.
    pub checklist: Vec<ChecklistItem>,
    /// Normalized horizontal position on the plan image.
    pub x: f64,
    /// Normalized vertical position on the plan image.
    pub y: f64,
    /// Owning user. Serialized as `userId` to match the persisted document
    /// layout; queries filter on it, nothing else enforces it.
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl Task {
    /// Creates a task at the plan center with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        checklist: Vec<ChecklistItem>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, checklist, user_id)
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by read paths where identity already exists in storage.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        checklist: Vec<ChecklistItem>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            checklist,
            x: DEFAULT_POSITION.0,
            y: DEFAULT_POSITION.1,
            user_id: user_id.into(),
        }
    }

    /// Validates the stated model invariants.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is empty after trimming.
    /// - `EmptyChecklist` when no checklist item remains.
    /// - `PositionOutOfRange` when `x`/`y` leave the normalized frame.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.checklist.is_empty() {
            return Err(TaskValidationError::EmptyChecklist);
        }
        if !in_plan_frame(self.x) || !in_plan_frame(self.y) {
            return Err(TaskValidationError::PositionOutOfRange {
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }

    /// Returns the checklist item with the given id.
    pub fn item(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.checklist.iter().find(|item| item.id == item_id)
    }

    /// Replaces the text of one item. Returns whether an item matched.
    ///
    /// Text content is not validated; empty text is allowed while editing
    /// and at save time.
    pub fn set_item_text(&mut self, item_id: &str, text: impl Into<String>) -> bool {
        match self.item_mut(item_id) {
            Some(item) => {
                item.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Replaces the status of one item. Returns whether an item matched.
    ///
    /// Any status may follow any other; there are no forbidden transitions.
    pub fn set_item_status(&mut self, item_id: &str, status: ChecklistStatus) -> bool {
        match self.item_mut(item_id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Appends one item, keeping insertion order.
    pub fn push_item(&mut self, item: ChecklistItem) {
        self.checklist.push(item);
    }

    /// Removes the item with the given id.
    ///
    /// Removal is rejected while the checklist holds a single item, so a
    /// task never reaches an empty checklist through this path. Returns
    /// `Ok(false)` when no item matches.
    pub fn remove_item(&mut self, item_id: &str) -> Result<bool, TaskValidationError> {
        if self.checklist.len() <= 1 {
            return Err(TaskValidationError::LastChecklistItem);
        }
        let before = self.checklist.len();
        self.checklist.retain(|item| item.id != item_id);
        Ok(self.checklist.len() < before)
    }

    fn item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.checklist.iter_mut().find(|item| item.id == item_id)
    }
}

fn in_plan_frame(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Validation failures for task model invariants.
///
/// All variants are recoverable: the caller corrects the input and retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Checklist holds no items.
    EmptyChecklist,
    /// Position is outside the normalized [0.0, 1.0] frame or not finite.
    PositionOutOfRange { x: f64, y: f64 },
    /// Removing this item would leave the checklist empty.
    LastChecklistItem,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EmptyChecklist => {
                write!(f, "task checklist must contain at least one item")
            }
            Self::PositionOutOfRange { x, y } => write!(
                f,
                "task position ({x}, {y}) is outside the normalized plan frame"
            ),
            Self::LastChecklistItem => {
                write!(f, "cannot remove the last remaining checklist item")
            }
        }
    }
}

impl Error for TaskValidationError {}
