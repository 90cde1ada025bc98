//! Domain module for task management.
//!
//! This module contains the task model and the search vocabulary.

pub mod search;
pub mod task;

pub use search::{
    Sort, SortColumn, SortDirection, TaskFilter, TaskSearchValues, end_of_day, start_of_day,
};
pub use task::{Task, TaskId};
