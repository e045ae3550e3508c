use axum::{Extension, Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, client_info};
use super::{ApiError, ApiResponse, AppState, UserDto, require_capability};
use crate::api::validation;
use crate::domain::Capability;

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// GET /users
/// User management listing. Staff/admin only; hashes never leave the
/// repository layer.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_capability(&user, Capability::ManageUsers)?;

    let users = state.store().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.iter().map(UserDto::from).collect(),
    )))
}

/// POST /users/staff
/// Create a STAFF account. Admin only.
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_capability(&user, Capability::CreateStaff)?;

    let username = validation::validate_username(&payload.username)?;
    let email = validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;
    validation::validate_passwords_match(&payload.password, &payload.confirm_password)?;

    let staff = state
        .auth()
        .create_staff(&user, username, email, &payload.password, &client_info(&headers))
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(&staff))))
}
