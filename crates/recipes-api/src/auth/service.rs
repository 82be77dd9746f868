//! Authentication service layer
//!
//! Business logic for registration, login, and identity lookup. Handlers
//! stay thin; everything that touches the store or the hasher lives here.

use super::jwt::{issue_token, JwtConfig};
use super::password::{hash_password, verify_password};
use crate::error::AppError;
use recipes_core::{RecipeStore, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public user fields, safe to return to any caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: RecipeStore,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(store: RecipeStore, jwt_config: JwtConfig) -> Self {
        Self { store, jwt_config }
    }

    /// Register a new user
    ///
    /// The password is hashed before it touches the store; the response
    /// carries public fields only, never the hash.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

        // Duplicate emails surface as CoreError::DuplicateEmail from the
        // store's unique index, covering concurrent registrations too
        let user = self.store.create_user(&request.email, &password_hash).await?;

        tracing::info!(user_id = user.id, "registered new user");

        Ok(user.into())
    }

    /// Authenticate and issue a bearer token
    ///
    /// An unknown email and a wrong password return the identical
    /// `InvalidCredentials` error so the response never leaks which part
    /// was wrong.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        let user = self
            .store
            .find_user_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_valid =
            verify_password(&request.password, &user.password_hash).unwrap_or(false);
        if !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = issue_token(&self.jwt_config, user.id)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Public fields of a user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<UserResponse, AppError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(user.into())
    }
}
