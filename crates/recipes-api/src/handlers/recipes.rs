//! Recipe and favorites API handlers
//!
//! CRUD over recipes plus the favorites relation, gated by ownership
//! checks. Read endpoints serve both authenticated and anonymous viewers;
//! the `is_favorite` annotation is computed only when a viewer is present.

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use recipes_core::{NewRecipe, Recipe, RecipePatch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Body for creating a recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRecipeRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Body for a partial recipe update
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

/// Body for adding a favorite
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteRequest {
    pub recipe_id: i64,
}

/// Recipe with its viewer-specific favorite annotation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub owner_id: i64,
    pub is_favorite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RecipeResponse {
    fn new(recipe: Recipe, is_favorite: bool) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            owner_id: recipe.owner_id,
            is_favorite,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

/// Paginated recipe list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeResponse>,
    /// Count of recipes in this page, not across all pages
    pub total: usize,
}

/// Status message for favorite operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

/// Query parameters for browsing recipes
#[derive(Debug, Deserialize, IntoParams)]
pub struct BrowseQuery {
    /// Search string matched against title, description, and ingredients
    pub q: Option<String>,

    /// Number of recipes to skip
    #[param(default = 0)]
    pub skip: Option<i64>,

    /// Page size
    #[param(default = 20)]
    pub limit: Option<i64>,
}

/// Create a new recipe owned by the current user
#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 422, description = "Invalid input", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let recipe = state
        .store
        .create_recipe(
            user.id,
            &NewRecipe {
                title: request.title,
                description: request.description,
                ingredients: request.ingredients,
                instructions: request.instructions,
            },
        )
        .await?;

    tracing::info!(recipe_id = recipe.id, owner_id = user.id, "created recipe");

    // A newly created recipe is never pre-favorited
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(recipe, false))))
}

/// Browse or search recipes
///
/// With `q`, a recipe matches when its title or description contains the
/// substring case-insensitively, or its ingredient list contains exactly
/// `q`. Authenticated viewers get a per-recipe `is_favorite` flag computed
/// from their favorite set, fetched once for the whole page.
#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    params(BrowseQuery),
    responses(
        (status = 200, description = "Paginated recipe list", body = RecipeListResponse),
    )
)]
pub async fn browse_recipes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrowseQuery>,
    viewer: Option<Extension<CurrentUser>>,
) -> Result<impl IntoResponse, AppError> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(20).max(0);

    let recipes = state
        .store
        .search_recipes(query.q.as_deref(), skip, limit)
        .await?;

    let fav_ids = viewer_favorites(&state, viewer.as_deref()).await?;

    // total reflects the current page, not the filtered universe; callers
    // cannot use it for cross-page counts
    let total = recipes.len();
    let recipes = recipes
        .into_iter()
        .map(|r| {
            let is_favorite = fav_ids.contains(&r.id);
            RecipeResponse::new(r, is_favorite)
        })
        .collect();

    Ok(Json(RecipeListResponse { recipes, total }))
}

/// Get recipe details by ID
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ApiError),
    )
)]
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    viewer: Option<Extension<CurrentUser>>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = state
        .store
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    let fav_ids = viewer_favorites(&state, viewer.as_deref()).await?;
    let is_favorite = fav_ids.contains(&recipe.id);

    Ok(Json(RecipeResponse::new(recipe, is_favorite)))
}

/// Edit an existing recipe (owner only)
///
/// Only the fields present in the body are changed.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 403, description = "Not the owner", body = crate::error::ApiError),
        (status = 404, description = "Recipe not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = state
        .store
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    if existing.owner_id != user.id {
        return Err(AppError::Forbidden(
            "Only the owner may edit a recipe".to_string(),
        ));
    }

    let recipe = state
        .store
        .update_recipe(
            id,
            &RecipePatch {
                title: request.title,
                description: request.description,
                ingredients: request.ingredients,
                instructions: request.instructions,
            },
        )
        .await?;

    let is_favorite = state.store.favorite_ids(user.id).await?.contains(&recipe.id);

    Ok(Json(RecipeResponse::new(recipe, is_favorite)))
}

/// Delete a recipe (owner only)
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ApiError),
        (status = 404, description = "Recipe not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let existing = state
        .store
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    if existing.owner_id != user.id {
        return Err(AppError::Forbidden(
            "Only the owner may delete a recipe".to_string(),
        ));
    }

    state.store.delete_recipe(id).await?;

    tracing::info!(recipe_id = id, owner_id = user.id, "deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the current user's favorites
///
/// Idempotent: favoriting an already-favorited recipe is a no-op.
#[utoipa::path(
    post,
    path = "/recipes/favorite",
    tag = "recipes",
    request_body = FavoriteRequest,
    responses(
        (status = 201, description = "Recipe added to favorites", body = DetailResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .store
        .get_recipe(request.recipe_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    state.store.add_favorite(user.id, request.recipe_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DetailResponse {
            detail: "Recipe added to favorites".to_string(),
        }),
    ))
}

/// Remove a recipe from the current user's favorites
///
/// Idempotent: removing a recipe that was never favorited is a no-op.
#[utoipa::path(
    delete,
    path = "/recipes/favorite/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe removed from favorites"),
        (status = 404, description = "Recipe not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    state
        .store
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    state.store.remove_favorite(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List every favorite of the current user
#[utoipa::path(
    get,
    path = "/recipes/favorites",
    tag = "recipes",
    responses(
        (status = 200, description = "Favorite recipes", body = RecipeListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = state.store.list_favorites(user.id).await?;

    let total = recipes.len();
    let recipes = recipes
        .into_iter()
        .map(|r| RecipeResponse::new(r, true))
        .collect();

    Ok(Json(RecipeListResponse { recipes, total }))
}

/// The viewer's favorite-id set, or empty for anonymous callers
async fn viewer_favorites(
    state: &AppState,
    viewer: Option<&CurrentUser>,
) -> Result<HashSet<i64>, AppError> {
    match viewer {
        Some(user) => Ok(state.store.favorite_ids(user.id).await?),
        None => Ok(HashSet::new()),
    }
}
