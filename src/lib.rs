//! # todo-backend
//!
//! Task service core for a personal todo application.
//!
//! ## Overview
//!
//! - **Domain**: [`domain::Task`] and the search vocabulary
//!   ([`domain::TaskSearchValues`], [`domain::Sort`], day-boundary helpers)
//! - **Infrastructure**: the [`infrastructure::TaskRepository`] contract and an
//!   in-memory implementation
//! - **Service**: [`service::TaskService`], which validates and normalizes
//!   requests, caches results, and delegates to the repository
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use todo_backend::domain::{Task, TaskSearchValues};
//! use todo_backend::infrastructure::InMemoryTaskRepository;
//! use todo_backend::service::TaskService;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let service = TaskService::new(Arc::new(InMemoryTaskRepository::new()));
//! let task = service.add(&Task::new("Call mom", "me@example.com")).await.unwrap();
//!
//! let search = TaskSearchValues {
//!     title: Some("mom".to_string()),
//!     sort_column: Some("title".to_string()),
//!     ..TaskSearchValues::for_email("me@example.com")
//! };
//! let page = service.find_by_params(&search).await.unwrap();
//! assert_eq!(page.items, vec![task]);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod domain;
pub mod infrastructure;
pub mod service;
