//! Recipes Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout the Recipe
//! Explorer backend:
//! - Domain models (users, recipes, favorites)
//! - Common error types
//! - Configuration management
//! - Postgres-backed store (SQLx)

pub mod config;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, ServerConfig};
pub use store::RecipeStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors produced by the store
///
/// Credential, authorization, and input-validation failures are raised at
/// the API layer, not here; configuration loading has its own
/// [`ConfigError`].
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================================================
// Domain Models
// ============================================================================

/// A registered account
///
/// The password hash is never serialized in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: i64,

    /// Login email (unique)
    pub email: String,

    /// Argon2id hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the account is active
    pub is_active: bool,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A recipe with exactly one owner
///
/// The owner reference is immutable after creation; only the owner may
/// update or delete the recipe. Ingredient and instruction sequences keep
/// their insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Partial update for an existing recipe
///
/// Only fields that are present are written; everything else is left
/// untouched. An all-`None` patch is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

impl RecipePatch {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
    }
}
