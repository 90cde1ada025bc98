//! In-memory task repository.
//!
//! Mirrors the semantics of the relational task query: inclusive date
//! bounds, case-insensitive title matching, and SQL null ordering (nulls are
//! the largest value, so they sort last ascending and first descending).
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Ordered storage keyed by id
//! - Monotonic id sequence shared by all clones

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Sort, SortColumn, Task, TaskFilter, TaskId};
use crate::infrastructure::{Page, PageRequest, RepositoryError, TaskRepository};

// =============================================================================
// Filtering and Ordering
// =============================================================================

/// Returns `true` if `task` satisfies every restriction in `filter`.
fn task_matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    let title_matches = filter
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .is_none_or(|title| task.title.to_lowercase().contains(&title.to_lowercase()));

    title_matches
        && task.completed == filter.completed
        && filter
            .priority_id
            .is_none_or(|priority_id| task.priority_id == Some(priority_id))
        && filter
            .category_id
            .is_none_or(|category_id| task.category_id == Some(category_id))
        && task.user_email == filter.email
        && filter
            .date_from
            .is_none_or(|from| task.date.is_some_and(|date| date >= from))
        && filter
            .date_to
            .is_none_or(|to| task.date.is_some_and(|date| date <= to))
}

/// Compares optional values with absent values ordered after present ones.
fn compare_nullable<T: Ord>(left: Option<T>, right: Option<T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_by_column(left: &Task, right: &Task, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => compare_nullable(left.id, right.id),
        SortColumn::Title => left.title.cmp(&right.title),
        SortColumn::Completed => left.completed.cmp(&right.completed),
        SortColumn::Date => compare_nullable(left.date, right.date),
        SortColumn::Priority => compare_nullable(left.priority_id, right.priority_id),
        SortColumn::Category => compare_nullable(left.category_id, right.category_id),
    }
}

/// Compares two tasks column by column in the sort's direction.
fn compare_tasks(left: &Task, right: &Task, sort: &Sort) -> Ordering {
    let ordering = sort
        .columns()
        .iter()
        .map(|column| compare_by_column(left, right, *column))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal);

    if sort.direction().is_ascending() {
        ordering
    } else {
        ordering.reverse()
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```
/// use todo_backend::domain::Task;
/// use todo_backend::infrastructure::{InMemoryTaskRepository, TaskRepository};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repository = InMemoryTaskRepository::new();
/// let saved = repository.save(&Task::new("My task", "user@example.com")).await.unwrap();
///
/// let found = repository.find_by_id(saved.id.unwrap()).await.unwrap();
/// assert_eq!(found, Some(saved));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<TaskId, Task>>>,
    /// Last id handed out or observed.
    sequence: Arc<AtomicI64>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if no task is stored.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn find_by_user_email_order_by_title_asc(
        &self,
        email: &str,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let email = email.to_string();
        async move {
            let guard = tasks.read().await;
            let mut owned: Vec<Task> = guard
                .values()
                .filter(|task| task.user_email == email)
                .cloned()
                .collect();
            drop(guard);

            owned.sort_by(|left, right| {
                left.title
                    .cmp(&right.title)
                    .then_with(|| compare_nullable(left.id, right.id))
            });
            Ok(owned)
        }
        .boxed()
    }

    fn save(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let sequence = Arc::clone(&self.sequence);
        let task = task.clone();
        async move {
            if task.user_email.trim().is_empty() {
                return Err(RepositoryError::ConstraintViolation(
                    "task must belong to a user".to_string(),
                ));
            }

            let mut guard = tasks.write().await;

            let id = match task.id {
                Some(id) => {
                    sequence.fetch_max(id.value(), AtomicOrdering::SeqCst);
                    id
                }
                None => TaskId::new(sequence.fetch_add(1, AtomicOrdering::SeqCst) + 1),
            };

            let stored = task.with_id(id);
            guard.insert(id, stored.clone());
            Ok(stored)
        }
        .boxed()
    }

    fn delete_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            tasks.write().await.remove(&id);
            Ok(())
        }
        .boxed()
    }

    fn find_by_params(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> BoxFuture<'static, Result<Page<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let filter = filter.clone();
        let page_request = page_request.clone();
        async move {
            let guard = tasks.read().await;
            let mut matching: Vec<Task> = guard
                .values()
                .filter(|task| task_matches_filter(task, &filter))
                .cloned()
                .collect();
            drop(guard);

            matching.sort_by(|left, right| compare_tasks(left, right, &page_request.sort));

            let total = matching.len() as u64;
            let offset = usize::try_from(page_request.offset()).unwrap_or(usize::MAX);
            let limit = page_request.limit() as usize;

            let items: Vec<Task> = matching.into_iter().skip(offset).take(limit).collect();

            Ok(Page::for_request(items, total, &page_request))
        }
        .boxed()
    }

    fn find_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move { Ok(tasks.read().await.get(&id).cloned()) }.boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
