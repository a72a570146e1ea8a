//! Application services - Use case implementations

mod due_scan_service;
mod task_service;
mod user_service;

pub use due_scan_service::{DueScanService, ScanOutcome};
pub use task_service::{
    CreateTaskInput, TaskDetails, TaskService, UpdateTaskInput, UserInput,
};
pub use user_service::UserService;
