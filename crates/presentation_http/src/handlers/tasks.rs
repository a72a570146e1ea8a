//! Task endpoints
//!
//! All write endpoints require `If-Match` carrying the base64 version
//! token; a stale token surfaces as 409 from the service layer.

use application::{
    CreateTaskInput, PageRequest, SortDirection, TaskQuery, TaskSortKey, UpdateTaskInput,
    UserInput,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use domain::value_objects::{Priority, TaskStatus, UserId};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, FieldError};
use crate::middleware::CorrelationId;
use crate::state::AppState;

use super::common::{
    PagedResponse, TaskResponse, collect_field_errors, require_if_match,
};

/// Embedded user reference in task bodies
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 40))]
    #[serde(default)]
    pub telephone: String,
}

impl From<UserRef> for UserInput {
    fn from(user: UserRef) -> Self {
        Self {
            full_name: user.full_name,
            email: user.email,
            telephone: user.telephone,
        }
    }
}

/// Body for POST /tasks
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: String,
    pub due_date_utc: DateTime<Utc>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[validate(nested)]
    pub owner: UserRef,
    #[validate(nested)]
    #[serde(default)]
    pub assignee: Option<UserRef>,
}

/// Body for PUT /tasks/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub due_date_utc: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub assigned_user_id: Option<Uuid>,
}

/// Body for PATCH /tasks/{id}/status
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: TaskStatus,
}

/// Body for PATCH /tasks/{id}/assignee; an absent id clears the assignee
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeUpdateRequest {
    pub assigned_user_id: Option<Uuid>,
}

/// Query parameters for GET /tasks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub scope: Option<String>,
    pub owner_user_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    /// Comma-separated status names
    pub status: Option<String>,
    /// Comma-separated priority names
    pub priority: Option<String>,
    pub overdue_only: Option<bool>,
    pub reminder_sent: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Json(body): Json<TaskCreateRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let corr = Some(corr.as_uuid());
    body.validate()
        .map_err(|e| ApiError::validation("invalid task", collect_field_errors(&e), corr))?;

    let input = CreateTaskInput {
        title: body.title,
        description: body.description,
        due_date: body.due_date_utc,
        priority: body.priority.unwrap_or_default(),
        status: body.status,
        owner: body.owner.into(),
        assignee: body.assignee.map(Into::into),
    };

    let details = state
        .task_service
        .create_task(input)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::from_details(details, Utc::now())),
    ))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let details = state
        .task_service
        .get_task(&id.into())
        .await
        .map_err(|e| ApiError::from_app(e, corr))?
        .ok_or_else(|| ApiError::not_found("Task", id, corr))?;

    Ok(Json(TaskResponse::from_details(details, Utc::now())))
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Query(params): Query<TaskListParams>,
) -> Result<Json<PagedResponse<TaskResponse>>, ApiError> {
    let corr = Some(corr.as_uuid());
    let query = build_query(params, corr)?;

    let page = state
        .task_service
        .list_tasks(&query)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    let now = Utc::now();
    Ok(Json(PagedResponse::from_page(page, |details| {
        TaskResponse::from_details(details, now)
    })))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<TaskUpdateRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let expected = require_if_match(&headers, corr)?;
    body.validate()
        .map_err(|e| ApiError::validation("invalid task", collect_field_errors(&e), corr))?;

    let input = UpdateTaskInput {
        title: body.title,
        description: body.description,
        due_date: body.due_date_utc,
        priority: body.priority,
        status: body.status,
        assignee_id: body.assigned_user_id.map(UserId::from_uuid),
    };

    let details = state
        .task_service
        .update_task(&id.into(), input, expected)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok(Json(TaskResponse::from_details(details, Utc::now())))
}

/// PATCH /tasks/{id}/status
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let expected = require_if_match(&headers, corr)?;

    let details = state
        .task_service
        .update_task_status(&id.into(), body.status, expected)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok(Json(TaskResponse::from_details(details, Utc::now())))
}

/// PATCH /tasks/{id}/assignee
pub async fn update_task_assignee(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<AssigneeUpdateRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let expected = require_if_match(&headers, corr)?;

    let details = state
        .task_service
        .update_task_assignee(
            &id.into(),
            body.assigned_user_id.map(UserId::from_uuid),
            expected,
        )
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok(Json(TaskResponse::from_details(details, Utc::now())))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let corr = Some(corr.as_uuid());
    state
        .task_service
        .delete_task(&id.into())
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Translate the query string into the composed task query
fn build_query(
    params: TaskListParams,
    corr: Option<Uuid>,
) -> Result<TaskQuery, ApiError> {
    let bad_param = |field: &str, message: String| {
        ApiError::validation(
            "invalid list parameters",
            vec![FieldError {
                field: field.to_string(),
                message,
            }],
            corr,
        )
    };

    let mut query = TaskQuery::all();

    match params.scope.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("any" | "all") => {
            if let Some(owner) = params.owner_user_id {
                query = query.owned_by(owner.into());
            }
            if let Some(assignee) = params.assigned_user_id {
                query = query.assigned_to(assignee.into());
            }
        }
        Some("owner") => {
            let owner = params
                .owner_user_id
                .ok_or_else(|| bad_param("ownerUserId", "required for scope=owner".to_string()))?;
            query = query.owned_by(owner.into());
        }
        Some("assignee") => {
            let assignee = params.assigned_user_id.ok_or_else(|| {
                bad_param("assignedUserId", "required for scope=assignee".to_string())
            })?;
            query = query.assigned_to(assignee.into());
        }
        Some(other) => {
            return Err(bad_param("scope", format!("unknown scope {other:?}")));
        }
    }

    if let Some(raw) = params.status.as_deref() {
        let statuses = parse_enum_list::<TaskStatus>(raw)
            .map_err(|message| bad_param("status", message))?;
        query = query.with_status_in(statuses);
    }
    if let Some(raw) = params.priority.as_deref() {
        let priorities = parse_enum_list::<Priority>(raw)
            .map_err(|message| bad_param("priority", message))?;
        query = query.with_priority_in(priorities);
    }
    if params.overdue_only == Some(true) {
        query = query.overdue_only();
    }
    if let Some(sent) = params.reminder_sent {
        query = query.with_reminder_sent(sent);
    }
    if let Some(search) = params.search {
        query = query.matching(search);
    }

    let sort_key = match params.sort_by.as_deref() {
        None => TaskSortKey::default(),
        Some(raw) => raw
            .parse::<TaskSortKey>()
            .map_err(|message| bad_param("sortBy", message))?,
    };
    let sort_dir = match params.sort_dir.as_deref() {
        None => SortDirection::default(),
        Some(raw) => raw
            .parse::<SortDirection>()
            .map_err(|message| bad_param("sortDir", message))?,
    };

    Ok(query
        .sorted_by(sort_key, sort_dir)
        .paged(PageRequest::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
        )))
}

/// Parse a comma-separated enum list, rejecting unknown members
fn parse_enum_list<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<Vec<T>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(T::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use application::TaskPredicate;

    use super::*;

    #[test]
    fn enum_lists_parse_and_reject() {
        let statuses = parse_enum_list::<TaskStatus>("Open, InProgress").unwrap();
        assert_eq!(statuses, vec![TaskStatus::Open, TaskStatus::InProgress]);

        assert!(parse_enum_list::<TaskStatus>("Open,Bogus").is_err());

        let priorities = parse_enum_list::<Priority>("High,Low").unwrap();
        assert_eq!(priorities, vec![Priority::High, Priority::Low]);
    }

    #[test]
    fn scope_owner_requires_an_owner_id() {
        let params = TaskListParams {
            scope: Some("owner".to_string()),
            ..TaskListParams::default()
        };
        let err = build_query(params, None).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let params = TaskListParams {
            scope: Some("team".to_string()),
            ..TaskListParams::default()
        };
        assert!(build_query(params, None).is_err());
    }

    #[test]
    fn filters_compose_into_predicates() {
        let owner = Uuid::new_v4();
        let params = TaskListParams {
            owner_user_id: Some(owner),
            status: Some("Open,Completed".to_string()),
            overdue_only: Some(true),
            search: Some("report".to_string()),
            sort_by: Some("priority".to_string()),
            sort_dir: Some("desc".to_string()),
            page: Some(2),
            page_size: Some(10),
            ..TaskListParams::default()
        };

        let query = build_query(params, None).unwrap();
        assert_eq!(query.predicates.len(), 4);
        assert!(query
            .predicates
            .contains(&TaskPredicate::ScopeOwner(owner.into())));
        assert!(query.predicates.contains(&TaskPredicate::OverdueOnly));
        assert_eq!(query.sort_key, TaskSortKey::Priority);
        assert_eq!(query.sort_direction, SortDirection::Desc);
        assert_eq!(query.page.page(), 2);
        assert_eq!(query.page.page_size(), 10);
    }

    #[test]
    fn create_request_deserializes_contract_shape() {
        let raw = r#"{
            "title": "T1",
            "description": "first",
            "dueDateUtc": "2030-01-01T00:00:00Z",
            "priority": "Medium",
            "owner": {"fullName": "A", "email": "a@x.io", "telephone": "+972501234567"}
        }"#;

        let body: TaskCreateRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(body.title, "T1");
        assert_eq!(body.priority, Some(Priority::Medium));
        assert!(body.status.is_none());
        assert!(body.assignee.is_none());
        assert_eq!(body.owner.email, "a@x.io");
        assert!(body.validate().is_ok());
    }

    #[test]
    fn update_request_tolerates_partial_bodies() {
        let body: TaskUpdateRequest =
            serde_json::from_str(r#"{"dueDateUtc": "2030-06-01T12:00:00Z"}"#).unwrap();
        assert!(body.title.is_none());
        assert!(body.due_date_utc.is_some());
    }
}
