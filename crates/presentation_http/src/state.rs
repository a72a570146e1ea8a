//! Application state shared across handlers

use std::sync::Arc;

use application::{TaskService, UserService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Task domain operations
    pub task_service: Arc<TaskService>,
    /// User domain operations
    pub user_service: Arc<UserService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
