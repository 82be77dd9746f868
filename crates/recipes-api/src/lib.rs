//! Recipes API - REST server
//!
//! HTTP surface for the Recipe Explorer backend: registration and login,
//! recipe CRUD with owner-only mutation, and per-user favorites.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register_handler,
        handlers::auth::login_handler,
        handlers::auth::me_handler,
        handlers::recipes::create_recipe,
        handlers::recipes::browse_recipes,
        handlers::recipes::get_recipe,
        handlers::recipes::update_recipe,
        handlers::recipes::delete_recipe,
        handlers::recipes::add_favorite,
        handlers::recipes::remove_favorite,
        handlers::recipes::list_favorites,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::recipes::CreateRecipeRequest,
        handlers::recipes::UpdateRecipeRequest,
        handlers::recipes::FavoriteRequest,
        handlers::recipes::RecipeResponse,
        handlers::recipes::RecipeListResponse,
        handlers::recipes::DetailResponse,
        auth::service::RegisterRequest,
        auth::service::LoginRequest,
        auth::service::TokenResponse,
        auth::service::UserResponse,
        error::ApiError,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Authentication & user ops"),
        (name = "recipes", description = "Recipe management and favorites"),
    )
)]
pub struct ApiDoc;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over a lazily-connected pool, for tests that never reach the
/// database (health, auth rejection, validation)
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    use recipes_core::{AppConfig, RecipeStore};

    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-signing-secret".to_string();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database.postgres_url)
        .expect("lazy pool from default URL");
    let store = RecipeStore::from_pool(pool);

    let state = Arc::new(AppState::new(config, store));
    create_router(state)
}
