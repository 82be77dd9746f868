//! Authentication and authorization module
//!
//! This module provides JWT-based authentication with the following
//! components:
//! - Token issuance and verification (HS256)
//! - Password hashing with Argon2
//! - Identity-resolving middleware (required and optional variants)
//! - Registration/login service

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{issue_token, verify_token, Claims, JwtConfig, TokenError};
pub use middleware::{auth_middleware, optional_auth_middleware, AuthError, CurrentUser};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthService, LoginRequest, RegisterRequest, TokenResponse, UserResponse};
