//! Core library for the task lists service
//!
//! This crate contains the business logic, including:
//! - Task list and task entities
//! - Transfer objects and the mapping between them and the entities
//! - Repository trait with SQLite and in-memory stores
//! - The task list service enforcing creation rules

pub mod error;
pub mod task_list;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
