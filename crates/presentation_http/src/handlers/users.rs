//! User endpoints

use application::{PageRequest, UserInput};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::CorrelationId;
use crate::state::AppState;

use super::common::{PagedResponse, UserResponse, collect_field_errors};

/// Body for POST /users
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 40))]
    #[serde(default)]
    pub telephone: String,
}

impl From<UserCreateRequest> for UserInput {
    fn from(body: UserCreateRequest) -> Self {
        Self {
            full_name: body.full_name,
            email: body.email,
            telephone: body.telephone,
        }
    }
}

/// Query parameters for GET /users
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Json(body): Json<UserCreateRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let corr = Some(corr.as_uuid());
    body.validate()
        .map_err(|e| ApiError::validation("invalid user", collect_field_errors(&e), corr))?;

    let user = state
        .user_service
        .create_user(body.into())
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let user = state
        .user_service
        .get_user(&id.into())
        .await
        .map_err(|e| ApiError::from_app(e, corr))?
        .ok_or_else(|| ApiError::not_found("User", id, corr))?;

    Ok(Json(user.into()))
}

/// GET /users/email/{email}
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let corr = Some(corr.as_uuid());
    let user = state
        .user_service
        .get_user_by_email(&email)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?
        .ok_or_else(|| ApiError::not_found("User", email, corr))?;

    Ok(Json(user.into()))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(corr): Extension<CorrelationId>,
    Query(params): Query<UserListParams>,
) -> Result<Json<PagedResponse<UserResponse>>, ApiError> {
    let corr = Some(corr.as_uuid());
    let page = PageRequest::new(params.page.unwrap_or(1), params.page_size.unwrap_or(20));

    let users = state
        .user_service
        .list_users(params.search.as_deref(), page)
        .await
        .map_err(|e| ApiError::from_app(e, corr))?;

    Ok(Json(PagedResponse::from_page(users, Into::into)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_validates_email_shape() {
        let body = UserCreateRequest {
            full_name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            telephone: String::new(),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn create_request_requires_a_name() {
        let body = UserCreateRequest {
            full_name: String::new(),
            email: "a@x.io".to_string(),
            telephone: String::new(),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn list_params_deserialize_from_camel_case() {
        let params: UserListParams =
            serde_json::from_str(r#"{"search":"ada","pageSize":5}"#).unwrap();
        assert_eq!(params.search.as_deref(), Some("ada"));
        assert_eq!(params.page_size, Some(5));
    }
}
