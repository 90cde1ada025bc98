//! Service module.
//!
//! This module contains the task service together with its configuration,
//! result cache, and error types.

pub mod cache;
pub mod config;
pub mod error;
pub mod task_service;

pub use cache::{CacheStats, ResultCache};
pub use config::{CacheConfig, ConfigurationError, ServiceConfig, ServiceConfigBuilder};
pub use error::ServiceError;
pub use task_service::{
    TaskCacheStats, TaskService, build_page_request, normalize_search, require_email,
};
