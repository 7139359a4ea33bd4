//! Route handlers

pub mod health;
pub mod task_list;
