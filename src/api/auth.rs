use axum::{
    Json,
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, TokenStatusDto, UserDto};
use crate::api::validation;
use crate::db::User;
use crate::services::ClientInfo;

/// Session attribute identifying the logged-in user; absence means anonymous
pub const SESSION_USER_ID: &str = "user_id";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub terms_agreed: bool,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// The authenticated user, resolved once per request by `require_user`
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Authentication middleware: resolves the session's `user_id` into a full
/// user record and stashes it in request extensions. A missing or stale
/// session yields 401.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = session
        .get::<i32>(SESSION_USER_ID)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .store()
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a CUSTOMER account and establish a session
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    // Logged-in users don't get a second registration form
    if let Some(user) = session_user(&state, &session).await? {
        return Ok(Json(ApiResponse::success(UserDto::from(&user))));
    }

    let username = validation::validate_username(&payload.username)?;
    let email = validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;
    validation::validate_passwords_match(&payload.password, &payload.confirm_password)?;

    if state.config().legal.has_terms_of_service_url() && !payload.terms_agreed {
        return Err(ApiError::validation(
            "Please agree to the terms of service",
        ));
    }

    let client = client_info(&headers);

    let user = state
        .auth()
        .register(username, email, &payload.password, &client)
        .await?;

    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(UserDto::from(&user))))
}

/// POST /auth/login
/// Authenticate with username and password
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if let Some(user) = session_user(&state, &session).await? {
        return Ok(Json(ApiResponse::success(UserDto::from(&user))));
    }

    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let client = client_info(&headers);

    let user = state
        .auth()
        .login(&payload.username, &payload.password, &client)
        .await?;

    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(UserDto::from(&user))))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
/// Current user information (requires authentication)
pub async fn me(
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(&user)))
}

/// POST /auth/forgot-password
/// Start the reset flow. The response is identical whether or not the
/// address is known, to avoid account enumeration.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let email = validation::validate_email(&payload.email)?;

    let base_url = base_url(&state, &headers);
    state.auth().forgot_password(email, &base_url).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "A password reset email has been sent. Please check your inbox.",
    ))))
}

/// GET /auth/reset-password/{token}
/// Report whether a reset token is currently usable
pub async fn check_reset_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<TokenStatusDto>>, ApiError> {
    let valid = state.auth().check_reset_token(&token).await?;
    Ok(Json(ApiResponse::success(TokenStatusDto { valid })))
}

/// POST /auth/reset-password
/// Complete the reset flow with a valid token
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validation::validate_password(&payload.new_password)?;
    validation::validate_passwords_match(&payload.new_password, &payload.confirm_password)?;

    state
        .auth()
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Your password has been updated. Please log in with your new password.",
    ))))
}

// ============================================================================
// Helpers
// ============================================================================

async fn session_user(state: &AppState, session: &Session) -> Result<Option<User>, ApiError> {
    let Some(user_id) = session
        .get::<i32>(SESSION_USER_ID)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Ok(None);
    };

    Ok(state.store().get_user_by_id(user_id).await?)
}

/// Client details for notification payloads, honoring common proxy headers
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("unknown")
        .to_string();

    let user_agent = headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();

    ClientInfo { ip, user_agent }
}

/// Base URL used in reset links: explicit config wins, Host header second
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.config().server.public_url {
        return url.trim_end_matches('/').to_string();
    }

    headers
        .get("Host")
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || "http://localhost".to_string(),
            |host| format!("http://{host}"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_info_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        headers.insert("User-Agent", HeaderValue::from_static("curl/8.0"));

        let client = client_info(&headers);
        assert_eq!(client.ip, "203.0.113.9");
        assert_eq!(client.user_agent, "curl/8.0");
    }

    #[test]
    fn test_client_info_falls_back() {
        let headers = HeaderMap::new();
        let client = client_info(&headers);
        assert_eq!(client.ip, "unknown");
        assert_eq!(client.user_agent, "Unknown");
    }

    #[test]
    fn test_client_info_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-IP", HeaderValue::from_static("198.51.100.7"));

        let client = client_info(&headers);
        assert_eq!(client.ip, "198.51.100.7");
    }
}
