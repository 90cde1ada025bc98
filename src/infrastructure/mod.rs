//! Infrastructure module for data access.
//!
//! This module contains the repository contract and its in-memory implementation.

pub mod in_memory;
pub mod repository;

pub use in_memory::InMemoryTaskRepository;
pub use repository::{Page, PageRequest, RepositoryError, TaskRepository};
