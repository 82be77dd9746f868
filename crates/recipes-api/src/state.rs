//! Application state management

use crate::auth::JwtConfig;
use recipes_core::{AppConfig, RecipeStore};

/// Application state shared across handlers
///
/// Constructed once at startup and passed behind an `Arc`; request handlers
/// receive the store handle and token configuration from here rather than
/// looking anything up ambiently.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Postgres-backed store
    pub store: RecipeStore,
    /// Token signing configuration
    pub jwt: JwtConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, store: RecipeStore) -> Self {
        let jwt = JwtConfig::from_app_config(&config);
        Self { config, store, jwt }
    }
}
