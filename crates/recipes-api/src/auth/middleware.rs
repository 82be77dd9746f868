//! Identity resolution middleware
//!
//! Extracts the bearer token from the Authorization header, verifies it,
//! and resolves the subject against the user store. On success the resolved
//! [`CurrentUser`] is added to request extensions, where handlers pick it
//! up via `Extension<CurrentUser>` (or `Option<Extension<CurrentUser>>` on
//! endpoints that also serve anonymous callers).

use super::jwt::{verify_token, TokenError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Authenticated identity resolved from a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Numeric user ID
    pub id: i64,
    /// User's email address
    pub email: String,
    /// Whether the account is active
    pub is_active: bool,
}

/// Identity resolution errors
///
/// Every variant maps to 401: a caller either is authenticated or is not,
/// and the response does not say which part of the credential failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Unknown user")]
    UnknownUser,

    #[error("Identity lookup failed: {0}")]
    LookupFailed(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::LookupFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            _ => (StatusCode::UNAUTHORIZED, "Could not validate credentials"),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Resolve the request's bearer token to a user, or fail
///
/// Takes only the headers rather than the whole request: `Body` is not
/// `Sync`, and borrowing the request across the store lookup would make
/// the middleware futures non-`Send`.
async fn resolve_identity(
    state: &AppState,
    headers: &header::HeaderMap,
) -> Result<CurrentUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = verify_token(&state.jwt, token)?;

    // The subject must still exist: tokens outlive nothing here
    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await
        .map_err(|e| AuthError::LookupFailed(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::UnknownUser);
    }

    Ok(CurrentUser {
        id: user.id,
        email: user.email,
        is_active: user.is_active,
    })
}

/// Authentication middleware that requires a valid bearer token
///
/// Missing header, malformed header, bad signature, expired token, and a
/// subject that no longer resolves to a user all produce 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    match resolve_identity(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected unauthenticated request");
            Err(e)
        }
    }
}

/// Optional authentication middleware
///
/// Unlike [`auth_middleware`], resolution failure degrades to anonymous
/// instead of erroring. Read endpoints use this to vary their response
/// shape (the favorite flag) between authenticated and anonymous viewers.
pub async fn optional_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Ok(user) = resolve_identity(&state, request.headers()).await {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}
