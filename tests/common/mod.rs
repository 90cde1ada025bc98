//! Common test helpers for integration tests.
//!
//! Provides repository doubles and task fixtures shared by the service tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every helper.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Notify;

use todo_backend::domain::{Task, TaskFilter, TaskId};
use todo_backend::infrastructure::{
    InMemoryTaskRepository, Page, PageRequest, RepositoryError, TaskRepository,
};
use todo_backend::service::{ServiceConfig, TaskService};

pub const EMAIL: &str = "owner@example.com";
pub const OTHER_EMAIL: &str = "other@example.com";

// =============================================================================
// Recording Repository
// =============================================================================

/// Delegates to an in-memory repository and records every call.
#[derive(Debug, Default)]
pub struct RecordingTaskRepository {
    inner: InMemoryTaskRepository,
    list_calls: AtomicUsize,
    search_calls: AtomicUsize,
    save_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    last_search: Mutex<Option<(TaskFilter, PageRequest)>>,
}

impl RecordingTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Returns the filter and page request of the most recent search.
    pub fn last_search(&self) -> Option<(TaskFilter, PageRequest)> {
        self.last_search.lock().unwrap().clone()
    }
}

impl TaskRepository for RecordingTaskRepository {
    fn find_by_user_email_order_by_title_asc(
        &self,
        email: &str,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_user_email_order_by_title_asc(email)
    }

    fn save(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.save(task)
    }

    fn delete_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(id)
    }

    fn find_by_params(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> BoxFuture<'static, Result<Page<Task>, RepositoryError>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((filter.clone(), page_request.clone()));
        self.inner.find_by_params(filter, page_request)
    }

    fn find_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        self.inner.find_by_id(id)
    }
}

// =============================================================================
// Failing Repository
// =============================================================================

/// Fails every call with a database error and counts the attempts.
#[derive(Debug, Default)]
pub struct FailingTaskRepository {
    calls: Arc<AtomicUsize>,
}

impl FailingTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'static, Result<T, RepositoryError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Err(RepositoryError::DatabaseError("connection refused".to_string())) }.boxed()
    }
}

impl TaskRepository for FailingTaskRepository {
    fn find_by_user_email_order_by_title_asc(
        &self,
        _email: &str,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        self.fail()
    }

    fn save(&self, _task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        self.fail()
    }

    fn delete_by_id(&self, _id: TaskId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        self.fail()
    }

    fn find_by_params(
        &self,
        _filter: &TaskFilter,
        _page_request: &PageRequest,
    ) -> BoxFuture<'static, Result<Page<Task>, RepositoryError>> {
        self.fail()
    }

    fn find_by_id(&self, _id: TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        self.fail()
    }
}

// =============================================================================
// Gated Repository
// =============================================================================

/// Holds the first read after its snapshot is taken until released.
///
/// Lets a test complete a write between a read's repository call and the
/// moment the service caches its result.
#[derive(Debug)]
pub struct GatedTaskRepository {
    inner: InMemoryTaskRepository,
    armed: Arc<AtomicBool>,
    loaded: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedTaskRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryTaskRepository::new(),
            armed: Arc::new(AtomicBool::new(true)),
            loaded: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    /// Waits until the held read has taken its snapshot.
    pub async fn wait_until_loaded(&self) {
        self.loaded.notified().await;
    }

    /// Lets the held read return.
    pub fn release(&self) {
        self.release.notify_one();
    }

    fn hold<T: Send + 'static>(
        &self,
        read: BoxFuture<'static, Result<T, RepositoryError>>,
    ) -> BoxFuture<'static, Result<T, RepositoryError>> {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return read;
        }
        let loaded = Arc::clone(&self.loaded);
        let release = Arc::clone(&self.release);
        async move {
            let snapshot = read.await;
            loaded.notify_one();
            release.notified().await;
            snapshot
        }
        .boxed()
    }
}

impl TaskRepository for GatedTaskRepository {
    fn find_by_user_email_order_by_title_asc(
        &self,
        email: &str,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        self.hold(self.inner.find_by_user_email_order_by_title_asc(email))
    }

    fn save(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        self.inner.save(task)
    }

    fn delete_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        self.inner.delete_by_id(id)
    }

    fn find_by_params(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> BoxFuture<'static, Result<Page<Task>, RepositoryError>> {
        self.hold(self.inner.find_by_params(filter, page_request))
    }

    fn find_by_id(&self, id: TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        self.inner.find_by_id(id)
    }
}

// =============================================================================
// Service Helpers
// =============================================================================

/// Creates a service over a recording repository, returning both.
pub fn recording_service() -> (TaskService, Arc<RecordingTaskRepository>) {
    recording_service_with_config(ServiceConfig::default())
}

pub fn recording_service_with_config(
    config: ServiceConfig,
) -> (TaskService, Arc<RecordingTaskRepository>) {
    let repository = Arc::new(RecordingTaskRepository::new());
    let service = TaskService::with_config(repository.clone(), config);
    (service, repository)
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn datetime(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Adds the given tasks through the service and returns them with ids.
pub async fn add_all(service: &TaskService, tasks: Vec<Task>) -> Vec<Task> {
    let mut saved = Vec::with_capacity(tasks.len());
    for task in tasks {
        saved.push(service.add(&task).await.unwrap());
    }
    saved
}

/// A small task list for `EMAIL` plus one task of `OTHER_EMAIL`.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("Buy milk", EMAIL)
            .with_priority_id(2)
            .with_category_id(1)
            .with_date(datetime(10, 9, 0)),
        Task::new("Write report", EMAIL)
            .with_completed(true)
            .with_priority_id(1)
            .with_category_id(2)
            .with_date(datetime(12, 18, 30)),
        Task::new("Call plumber", EMAIL).with_priority_id(3),
        Task::new("Buy bread", EMAIL)
            .with_category_id(1)
            .with_date(datetime(11, 23, 59)),
        Task::new("Buy paint", OTHER_EMAIL),
    ]
}

pub fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}
