//! Task service.
//!
//! Mediates between a caller (typically an HTTP controller) and the
//! [`TaskRepository`]. The service owns two result caches: task lists keyed by
//! owner email and search pages keyed by the normalized query. Any write made
//! through the service clears both, and a result loaded while a write was in
//! flight is returned but not cached.
//!
//! Search values are normalized before the repository sees them:
//!
//! - a missing or blank email is rejected with [`ServiceError::IncorrectData`]
//! - `completed` becomes `true` only for the integer flag `1`
//! - `date_from` moves to 00:00:01.001 and `date_to` to 23:59:59.999 of their day
//! - the sort direction is ascending unless a non-blank value other than `asc` is given
//! - the id is always appended as the last sort column

use std::sync::Arc;

use crate::domain::{
    Sort, SortColumn, SortDirection, Task, TaskFilter, TaskId, TaskSearchValues, end_of_day,
    start_of_day,
};
use crate::infrastructure::{Page, PageRequest, TaskRepository};

use super::cache::{CacheStats, ResultCache};
use super::config::ServiceConfig;
use super::error::ServiceError;

// =============================================================================
// Normalization
// =============================================================================

/// Returns the email if it is present and not blank.
///
/// # Errors
///
/// Returns [`ServiceError::IncorrectData`] for a missing or blank email.
pub fn require_email(email: Option<&str>) -> Result<&str, ServiceError> {
    match email {
        Some(email) if !email.trim().is_empty() => Ok(email),
        _ => Err(ServiceError::missing_param("email")),
    }
}

/// Parses an optional sort column; absent or blank means none.
fn parse_sort_column(value: Option<&str>) -> Result<Option<SortColumn>, ServiceError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.parse().map_err(ServiceError::IncorrectData))
        .transpose()
}

/// Builds the page request for a search.
///
/// An absent page number is 0 and an absent page size is `default_page_size`.
///
/// # Errors
///
/// Returns [`ServiceError::IncorrectData`] for a negative page number, a page
/// size below one, or an unknown sort column.
pub fn build_page_request(
    values: &TaskSearchValues,
    default_page_size: u32,
) -> Result<PageRequest, ServiceError> {
    let page_number = match values.page_number {
        Some(number) => u32::try_from(number).map_err(|_| {
            ServiceError::IncorrectData("page number must not be less than zero".to_string())
        })?,
        None => 0,
    };

    let page_size = match values.page_size {
        Some(size) => u32::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                ServiceError::IncorrectData("page size must not be less than one".to_string())
            })?,
        None => default_page_size.max(1),
    };

    let direction = SortDirection::from_param(values.sort_direction.as_deref());
    let column = parse_sort_column(values.sort_column.as_deref())?;
    let sort = Sort::with_id_tie_breaker(direction, column);

    Ok(PageRequest::of(page_number, page_size, sort))
}

/// Normalizes search values into a repository filter and page request.
///
/// # Errors
///
/// Returns [`ServiceError::IncorrectData`] when the email is missing or blank,
/// or when paging or sorting parameters are invalid.
pub fn normalize_search(
    values: &TaskSearchValues,
    default_page_size: u32,
) -> Result<(TaskFilter, PageRequest), ServiceError> {
    let email = require_email(values.email.as_deref())?;

    let filter = TaskFilter {
        title: values.title.clone(),
        completed: values.completed == Some(1),
        priority_id: values.priority_id,
        category_id: values.category_id,
        email: email.to_string(),
        date_from: values.date_from.map(start_of_day),
        date_to: values.date_to.map(end_of_day),
    };

    let page_request = build_page_request(values, default_page_size)?;

    Ok((filter, page_request))
}

// =============================================================================
// Cache Keys and Statistics
// =============================================================================

/// Cache key of a normalized search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchKey {
    filter: TaskFilter,
    page_request: PageRequest,
}

/// Statistics of both service caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCacheStats {
    /// Per-email task list cache.
    pub lists: CacheStats,
    /// Search page cache.
    pub searches: CacheStats,
}

// =============================================================================
// Task Service
// =============================================================================

/// Application service for tasks.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use todo_backend::domain::{Task, TaskSearchValues};
/// use todo_backend::infrastructure::InMemoryTaskRepository;
/// use todo_backend::service::TaskService;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let service = TaskService::new(Arc::new(InMemoryTaskRepository::new()));
/// service.add(&Task::new("Water plants", "user@example.com")).await.unwrap();
///
/// let page = service
///     .find_by_params(&TaskSearchValues::for_email("user@example.com"))
///     .await
///     .unwrap();
/// assert_eq!(page.total, 1);
/// # });
/// ```
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    config: ServiceConfig,
    tasks_by_email: ResultCache<String, Vec<Task>>,
    task_pages: ResultCache<SearchKey, Page<Task>>,
}

impl TaskService {
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self::with_config(repository, ServiceConfig::default())
    }

    /// Creates a service with the given configuration.
    #[must_use]
    pub fn with_config(repository: Arc<dyn TaskRepository>, config: ServiceConfig) -> Self {
        Self {
            tasks_by_email: ResultCache::from_config(&config.cache),
            task_pages: ResultCache::from_config(&config.cache),
            repository,
            config,
        }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns all tasks of a user ordered by title ascending.
    ///
    /// Results are cached per email.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::IncorrectData`] for a blank email, or
    /// [`ServiceError::Repository`] if the repository fails.
    pub async fn find_all(&self, email: &str) -> Result<Vec<Task>, ServiceError> {
        let email = require_email(Some(email)).inspect_err(|error| {
            tracing::warn!(%error, "Rejected task listing");
        })?;

        let key = email.to_string();
        if let Some(tasks) = self.tasks_by_email.get(&key) {
            tracing::debug!(email = %email, count = tasks.len(), "Task list served from cache");
            return Ok(tasks);
        }

        let generation = self.tasks_by_email.generation();
        let tasks = self
            .repository
            .find_by_user_email_order_by_title_asc(email)
            .await?;

        tracing::debug!(email = %email, count = tasks.len(), "Task list loaded");
        if !self
            .tasks_by_email
            .put_if_generation(key, tasks.clone(), generation)
            && self.tasks_by_email.is_enabled()
        {
            tracing::debug!(email = %email, "Task list not cached: a write happened during load");
        }
        Ok(tasks)
    }

    /// Creates a task. Returns the persisted task with its id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if the repository fails.
    pub async fn add(&self, task: &Task) -> Result<Task, ServiceError> {
        let saved = self.repository.save(task).await?;
        self.evict_all();
        tracing::info!(task_id = ?saved.id, email = %saved.user_email, "Task added");
        Ok(saved)
    }

    /// Updates a task. Returns the persisted task.
    ///
    /// Like [`TaskService::add`] this is an upsert by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if the repository fails.
    pub async fn update(&self, task: &Task) -> Result<Task, ServiceError> {
        let saved = self.repository.save(task).await?;
        self.evict_all();
        tracing::info!(task_id = ?saved.id, email = %saved.user_email, "Task updated");
        Ok(saved)
    }

    /// Deletes a task. Deleting a missing task succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if the repository fails.
    pub async fn delete_by_id(&self, id: TaskId) -> Result<(), ServiceError> {
        self.repository.delete_by_id(id).await?;
        self.evict_all();
        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Returns one page of a user's tasks matching the search values.
    ///
    /// Results are cached per normalized query.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::IncorrectData`] for a missing or blank email or
    /// invalid paging and sorting parameters (the repository is not called),
    /// or [`ServiceError::Repository`] if the repository fails.
    pub async fn find_by_params(
        &self,
        values: &TaskSearchValues,
    ) -> Result<Page<Task>, ServiceError> {
        let (filter, page_request) = normalize_search(values, self.config.default_page_size)
            .inspect_err(|error| {
                tracing::warn!(%error, "Rejected task search");
            })?;

        let key = SearchKey {
            filter,
            page_request,
        };
        if let Some(page) = self.task_pages.get(&key) {
            tracing::debug!(email = %key.filter.email, "Task search served from cache");
            return Ok(page);
        }

        let generation = self.task_pages.generation();
        let page = self
            .repository
            .find_by_params(&key.filter, &key.page_request)
            .await?;

        tracing::debug!(
            email = %key.filter.email,
            total = page.total,
            page_number = page.page_number,
            sort = %key.page_request.sort,
            "Task search executed"
        );
        let email = key.filter.email.clone();
        if !self.task_pages.put_if_generation(key, page.clone(), generation)
            && self.task_pages.is_enabled()
        {
            tracing::debug!(email = %email, "Task search not cached: a write happened during load");
        }
        Ok(page)
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no such task exists, or
    /// [`ServiceError::Repository`] if the repository fails.
    pub async fn find_by_id(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Returns hit and miss counters of both caches.
    #[must_use]
    pub fn cache_stats(&self) -> TaskCacheStats {
        TaskCacheStats {
            lists: self.tasks_by_email.stats(),
            searches: self.task_pages.stats(),
        }
    }

    fn evict_all(&self) {
        self.tasks_by_email.clear();
        self.task_pages.clear();
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskService")
            .field("repository", &"Arc<dyn TaskRepository>")
            .field("config", &self.config)
            .field("tasks_by_email", &self.tasks_by_email)
            .field("task_pages", &self.task_pages)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
