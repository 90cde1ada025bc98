//! Task search vocabulary.
//!
//! [`TaskSearchValues`] is the raw parameter bag a client sends; the task
//! service normalizes it into a [`TaskFilter`] plus a page request before any
//! query runs. Sorting is described by [`Sort`], which always applies one
//! [`SortDirection`] to an ordered list of [`SortColumn`]s.

use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// =============================================================================
// Search Values
// =============================================================================

/// Filter, sort, and pagination parameters for a task search.
///
/// Every field is optional at the type level; `email` is required at runtime
/// and rejected by the service when missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskSearchValues {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// `1` selects completed tasks, anything else (including absence) uncompleted ones.
    pub completed: Option<i32>,
    /// Priority reference to match.
    pub priority_id: Option<i64>,
    /// Category reference to match.
    pub category_id: Option<i64>,
    /// Owner email; only this user's tasks are returned.
    pub email: Option<String>,
    /// Start of the due-date range (the calendar day is what counts).
    pub date_from: Option<NaiveDateTime>,
    /// End of the due-date range (the calendar day is what counts).
    pub date_to: Option<NaiveDateTime>,
    /// Primary sort column name.
    pub sort_column: Option<String>,
    /// `asc` (or nothing) for ascending, anything else for descending.
    pub sort_direction: Option<String>,
    /// Zero-based page number.
    pub page_number: Option<i32>,
    /// Number of tasks per page.
    pub page_size: Option<i32>,
}

impl TaskSearchValues {
    /// Creates search values scoped to the given email with nothing else set.
    #[must_use]
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// Normalized Filter
// =============================================================================

/// Normalized task filter handed to the repository.
///
/// Absent `title`, `priority_id`, `category_id`, `date_from` and `date_to`
/// mean "no restriction"; `completed` and `email` always restrict.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskFilter {
    /// Case-insensitive title substring; empty behaves like absent.
    pub title: Option<String>,
    /// Required completion state.
    pub completed: bool,
    /// Required priority reference.
    pub priority_id: Option<i64>,
    /// Required category reference.
    pub category_id: Option<i64>,
    /// Owner email.
    pub email: String,
    /// Inclusive lower bound on the due date.
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the due date.
    pub date_to: Option<NaiveDateTime>,
}

impl TaskFilter {
    /// Creates a filter for the given owner that matches uncompleted tasks.
    #[must_use]
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            title: None,
            completed: false,
            priority_id: None,
            category_id: None,
            email: email.into(),
            date_from: None,
            date_to: None,
        }
    }
}

// =============================================================================
// Day Boundaries
// =============================================================================

/// 00:00:01.001 as an offset from midnight.
const START_OF_DAY_OFFSET_MILLIS: i64 = 1_001;

/// 23:59:59.999 as an offset from midnight.
const END_OF_DAY_OFFSET_MILLIS: i64 = 86_399_999;

/// Moves a timestamp to 00:00:01.001 of its calendar day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use todo_backend::domain::start_of_day;
///
/// let value = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(17, 45, 0).unwrap();
/// let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_milli_opt(0, 0, 1, 1).unwrap();
///
/// assert_eq!(start_of_day(value), expected);
/// ```
#[must_use]
pub fn start_of_day(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::default()) + Duration::milliseconds(START_OF_DAY_OFFSET_MILLIS)
}

/// Moves a timestamp to 23:59:59.999 of its calendar day.
#[must_use]
pub fn end_of_day(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::default()) + Duration::milliseconds(END_OF_DAY_OFFSET_MILLIS)
}

// =============================================================================
// Sorting
// =============================================================================

/// Direction applied to every column of a [`Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Selects a direction from a raw request parameter.
    ///
    /// Absent, blank, and exactly `asc` (after trimming) are ascending. Every
    /// other value, including `ASC`, is descending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("" | "asc") => Self::Ascending,
            Some(_) => Self::Descending,
        }
    }

    /// Returns `true` for [`SortDirection::Ascending`].
    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(formatter, "ASC"),
            Self::Descending => write!(formatter, "DESC"),
        }
    }
}

/// Task columns that can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Primary key; the tie breaker appended to every sort.
    Id,
    /// Task title.
    Title,
    /// Completion flag.
    Completed,
    /// Due date.
    Date,
    /// Priority reference.
    Priority,
    /// Category reference.
    Category,
}

impl SortColumn {
    /// Returns the column name as used in query parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Completed => "completed",
            Self::Date => "date",
            Self::Priority => "priority",
            Self::Category => "category",
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    /// Parses a column name.
    ///
    /// Matching ignores case and underscores, so `priorityId`, `priority_id`
    /// and `PRIORITY` all select [`SortColumn::Priority`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('_', "").as_str() {
            "id" => Ok(Self::Id),
            "title" => Ok(Self::Title),
            "completed" => Ok(Self::Completed),
            "date" | "taskdate" => Ok(Self::Date),
            "priority" | "priorityid" => Ok(Self::Priority),
            "category" | "categoryid" => Ok(Self::Category),
            _ => Err(format!("Unknown sort column: {value}")),
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Ordered list of columns sharing one direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Sort {
    direction: SortDirection,
    columns: Vec<SortColumn>,
}

impl Sort {
    /// Creates a sort over the given columns.
    ///
    /// Repeated columns are dropped; only the first occurrence affects ordering.
    #[must_use]
    pub fn by(direction: SortDirection, columns: impl IntoIterator<Item = SortColumn>) -> Self {
        let mut unique = Vec::new();
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Self {
            direction,
            columns: unique,
        }
    }

    /// Creates a sort on `column` with the id appended as a tie breaker.
    ///
    /// With no primary column the sort is by id alone.
    #[must_use]
    pub fn with_id_tie_breaker(direction: SortDirection, column: Option<SortColumn>) -> Self {
        Self::by(direction, column.into_iter().chain([SortColumn::Id]))
    }

    /// Returns the direction shared by all columns.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Returns the columns in priority order.
    #[must_use]
    pub fn columns(&self) -> &[SortColumn] {
        &self.columns
    }
}

/// Renders as an `ORDER BY` list, e.g. `title DESC, id DESC`.
impl std::fmt::Display for Sort {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{column} {}", self.direction)?;
        }
        Ok(())
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::with_id_tie_breaker(SortDirection::Ascending, None)
    }
}

// =============================================================================
// Tests
// =============================================================================
