//! Authentication API handlers
//!
//! HTTP endpoints for registration, login, and the current-user lookup.

use crate::auth::{
    AuthService, CurrentUser, LoginRequest, RegisterRequest, UserResponse,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;

/// Register a new user account
///
/// # Responses
///
/// * `201 Created` - public fields of the new user
/// * `409 Conflict` - email already registered
/// * `422 Unprocessable Entity` - invalid email or password shorter than 6
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 409, description = "Email already registered", body = crate::error::ApiError),
        (status = 422, description = "Invalid input", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = AuthService::new(state.store.clone(), state.jwt.clone());
    let user = auth_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password
///
/// Unknown email and wrong password are indistinguishable in the response.
///
/// # Responses
///
/// * `200 OK` - bearer token
/// * `401 Unauthorized` - invalid credentials
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = AuthService::new(state.store.clone(), state.jwt.clone());
    let response = auth_service.login(request).await?;

    Ok(Json(response))
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        is_active: user.is_active,
    }))
}
