//! Shared handler plumbing: conditional-request parsing, response
//! envelopes, and validator-error translation

use application::{Page, TaskDetails};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use domain::entities::User;
use domain::value_objects::VersionToken;
use serde::Serialize;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::error::{ApiError, FieldError};

/// Conditional-request header carrying the base64 version token
pub const IF_MATCH: &str = "If-Match";

/// Extract and decode the `If-Match` version token
///
/// Missing or malformed tokens are client errors (400), not conflicts.
pub fn require_if_match(
    headers: &HeaderMap,
    correlation_id: Option<Uuid>,
) -> Result<VersionToken, ApiError> {
    let raw = headers
        .get(IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            ApiError::validation(
                "missing If-Match header",
                vec![FieldError {
                    field: IF_MATCH.to_string(),
                    message: "required for conditional updates".to_string(),
                }],
                correlation_id,
            )
        })?;

    VersionToken::from_base64(raw).map_err(|e| {
        ApiError::validation(
            "malformed If-Match header",
            vec![FieldError {
                field: IF_MATCH.to_string(),
                message: e.to_string(),
            }],
            correlation_id,
        )
    })
}

/// Flatten validator output into the error body's `details` array
#[must_use]
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(|err| FieldError {
                field: (*field).to_string(),
                message: err
                    .message
                    .as_ref()
                    .map_or_else(|| err.code.to_string(), ToString::to_string),
            })
        })
        .collect()
}

/// Paged response envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> PagedResponse<T> {
    /// Build from an application page, mapping each item
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(f).collect(),
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages,
        }
    }
}

/// User representation returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub telephone: String,
    pub created_at_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            full_name: user.full_name,
            email: user.email.to_string(),
            telephone: user.telephone,
            created_at_utc: user.created_at,
        }
    }
}

/// Task representation returned to clients
///
/// `status` is the effective status at response time - a non-terminal
/// task past its due date reads as `Overdue` without a write. The
/// version travels base64-encoded as `rowVersion`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date_utc: DateTime<Utc>,
    pub priority: domain::value_objects::Priority,
    pub status: domain::value_objects::TaskStatus,
    pub owner: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserResponse>,
    pub reminder_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_notified_at_utc: Option<DateTime<Utc>>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub row_version: String,
}

impl TaskResponse {
    /// Build from resolved task details, computing the effective status
    #[must_use]
    pub fn from_details(details: TaskDetails, now: DateTime<Utc>) -> Self {
        let task = details.task;
        Self {
            id: task.id.as_uuid(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date_utc: task.due_date,
            priority: task.priority,
            status: task.effective_status(now),
            owner: details.owner.into(),
            assignee: details.assignee.map(Into::into),
            reminder_sent: task.reminder_sent,
            due_notified_at_utc: task.due_notified_at,
            created_at_utc: task.created_at,
            updated_at_utc: task.updated_at,
            row_version: task.version.to_base64(),
        }
    }
}
