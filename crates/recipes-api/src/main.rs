//! Recipes API Server
//!
//! REST API server for the Recipe Explorer backend.

use recipes_api::{create_router, state::AppState};
use recipes_core::{AppConfig, RecipeStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipes_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration; a missing JWT_SECRET aborts startup
    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Connect the store and apply migrations
    let store = RecipeStore::new(&config.database.postgres_url, config.database.pool_size).await?;
    store.migrate().await?;

    // Create application state and router
    let state = Arc::new(AppState::new(config, store));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Recipes API server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
