//! Task list module
//!
//! Entities, transfer objects, storage and the service for task lists.

mod dto;
mod mapper;
mod memory_store;
mod model;
mod repository;
mod service;
mod sqlite_store;

pub use dto::{TaskDto, TaskListDto};
pub use mapper::progress;
pub use memory_store::InMemoryTaskListStore;
pub use model::*;
pub use repository::TaskListRepository;
pub use service::TaskListService;
pub use sqlite_store::SqliteTaskListStore;
