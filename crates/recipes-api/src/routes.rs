//! API route definitions

use crate::auth::middleware::{auth_middleware, optional_auth_middleware};
use crate::handlers::{auth, health, recipes};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Create the API routes
///
/// Three tiers: public (registration, login, health), optional-auth reads
/// (browse and detail vary their favorite flag by viewer), and protected
/// routes behind the required identity resolver.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/", get(health::health_check))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    // Read routes serving both authenticated and anonymous viewers
    let read_routes = Router::new()
        .route("/recipes", get(recipes::browse_recipes))
        .route("/recipes/:id", get(recipes::get_recipe))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/recipes", post(recipes::create_recipe))
        .route("/recipes/:id", put(recipes::update_recipe))
        .route("/recipes/:id", delete(recipes::delete_recipe))
        .route("/recipes/favorite", post(recipes::add_favorite))
        .route("/recipes/favorite/:id", delete(recipes::remove_favorite))
        .route("/recipes/favorites", get(recipes::list_favorites))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(read_routes)
        .merge(protected_routes)
}
