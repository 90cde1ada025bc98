//! Task domain model.
//!
//! A task is a single todo item owned by a user, identified by the user's
//! email address. Priority and category are references (ids) to entities
//! managed elsewhere.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// This is a newtype wrapper around the numeric primary key assigned by the
/// repository on first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a `TaskId` from a raw primary key value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw primary key value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// Task
// =============================================================================

/// The main task domain model.
///
/// `id` is `None` until the task has been saved; the repository assigns it.
///
/// # Examples
///
/// ```
/// use todo_backend::domain::Task;
///
/// let task = Task::new("Buy milk", "user@example.com")
///     .with_priority_id(2)
///     .with_category_id(7);
///
/// assert!(task.id.is_none());
/// assert!(!task.completed);
/// assert_eq!(task.priority_id, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Primary key, absent for tasks that were never persisted.
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Title of the task.
    pub title: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Reference to the task's priority.
    #[serde(default)]
    pub priority_id: Option<i64>,
    /// Reference to the task's category.
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Due date of the task.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    /// Email of the owning user.
    pub user_email: String,
}

impl Task {
    /// Creates a new, not yet persisted, uncompleted task.
    #[must_use]
    pub fn new(title: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            completed: false,
            priority_id: None,
            category_id: None,
            date: None,
            user_email: user_email.into(),
        }
    }

    /// Returns a new task with the given id.
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// Returns a new task with the given title.
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    /// Returns a new task with the completed flag set to the given value.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Returns a new task referencing the given priority.
    #[must_use]
    pub fn with_priority_id(self, priority_id: i64) -> Self {
        Self {
            priority_id: Some(priority_id),
            ..self
        }
    }

    /// Returns a new task referencing the given category.
    #[must_use]
    pub fn with_category_id(self, category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..self
        }
    }

    /// Returns a new task due at the given date.
    #[must_use]
    pub fn with_date(self, date: NaiveDateTime) -> Self {
        Self {
            date: Some(date),
            ..self
        }
    }

    /// Returns `true` if the task has been assigned a primary key.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
