//! Repository trait for tasks.
//!
//! Every method returns a boxed `Send` future so implementations can be
//! shared as `Arc<dyn TaskRepository>` across a multi-threaded runtime.
//! Arguments are copied into the future; nothing borrowed outlives the call.

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Sort, Task, TaskFilter, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Storage backend failure.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The task violates a storage constraint.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

// =============================================================================
// Pagination
// =============================================================================

/// A page number, a page size, and the ordering to page through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PageRequest {
    /// Page number (0-indexed).
    pub page_number: u32,
    /// Number of items per page.
    pub page_size: u32,
    /// Ordering applied before paging.
    pub sort: Sort,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    #[must_use]
    pub fn of(page_number: u32, page_size: u32, sort: Sort) -> Self {
        assert!(page_size > 0, "page_size must be greater than 0");
        Self {
            page_number,
            page_size,
            sort,
        }
    }

    /// Returns the number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_number as u64 * self.page_size as u64
    }

    /// Returns the maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.page_size
    }
}

/// One page of query results with the total across all pages.
///
/// Built from the [`PageRequest`] that produced it, so `page_size` is never 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Number of matching items across all pages.
    pub total: u64,
    /// Requested page (0-indexed).
    pub page_number: u32,
    /// Requested page size.
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Wraps the items selected for `request` out of `total` matches.
    #[must_use]
    pub const fn for_request(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page_number: request.page_number,
            page_size: request.page_size,
        }
    }

    /// Returns the number of pages needed to hold every match.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size as u64)
    }

    /// Returns true if matches remain after this page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page_number as u64 + 1) * (self.page_size as u64) < self.total
    }

    /// Returns true unless this is the first page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_number > 0
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Data access for tasks.
pub trait TaskRepository: Send + Sync {
    /// Lists all tasks owned by `email`, ordered by title ascending.
    fn find_by_user_email_order_by_title_asc(
        &self,
        email: &str,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Inserts or replaces a task by primary key.
    ///
    /// Tasks without an id are assigned one. Returns the stored task.
    fn save(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>>;

    /// Deletes a task by its ID. Deleting a missing task is not an error.
    fn delete_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<(), RepositoryError>>;

    /// Returns one page of the tasks matching `filter`, ordered by `page_request.sort`.
    fn find_by_params(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> BoxFuture<'static, Result<Page<Task>, RepositoryError>>;

    /// Finds a task by its ID.
    fn find_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================
