//! Route definitions

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, patch, post},
};

use crate::{handlers, middleware::propagate_correlation_id, state::AppState};

/// Create the main router with all routes
///
/// `/health` answers at the root and under the API base path, so both
/// infrastructure probes and API clients can reach it.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Users
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/users/email/{email}", get(handlers::users::get_user_by_email))
        .route("/users/{id}", get(handlers::users::get_user))
        // Tasks
        .route(
            "/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/status", patch(handlers::tasks::update_task_status))
        .route(
            "/tasks/{id}/assignee",
            patch(handlers::tasks::update_task_assignee),
        )
        // Health, reachable under the base path too
        .route("/health", get(handlers::health::health_check));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .layer(from_fn(propagate_correlation_id))
        .with_state(state)
}
