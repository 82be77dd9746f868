//! PostgreSQL store
//!
//! Provides user, recipe, and favorites persistence using SQLx and
//! PostgreSQL. Ingredient and instruction sequences are stored as `TEXT[]`
//! columns; the favorites relation is a set keyed by a composite primary
//! key on `(user_id, recipe_id)`, which makes concurrent idempotent
//! add/remove safe without application-level locking.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::collections::HashSet;

use crate::{CoreError, NewRecipe, Recipe, RecipePatch, Result, User};

/// PostgreSQL-backed store for users, recipes, and favorites
#[derive(Clone)]
pub struct RecipeStore {
    pool: PgPool,
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Recipe row from database
#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    title: String,
    description: Option<String>,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            title: row.title,
            description: row.description,
            ingredients: row.ingredients,
            instructions: row.instructions,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const RECIPE_COLUMNS: &str =
    "id, title, description, ingredients, instructions, owner_id, created_at, updated_at";

impl RecipeStore {
    /// Create a new store connection
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await
            .map_err(|e| CoreError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| CoreError::Database(format!("Migration failed: {e}")))?;

        Ok(())
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a new user
    ///
    /// The unique index on `email` enforces uniqueness at write time; a
    /// violation maps to [`CoreError::DuplicateEmail`].
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, password_hash, is_active)
            VALUES ($1, $2, TRUE)
            RETURNING id, email, password_hash, is_active, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CoreError::DuplicateEmail,
            _ => CoreError::Database(format!("Failed to create user: {e}")),
        })?;

        Ok(row.into())
    }

    /// Find user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, is_active, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to fetch user: {e}")))?;

        Ok(row.map(User::from))
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to fetch user: {e}")))?;

        Ok(row.map(User::from))
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    /// Insert a new recipe owned by `owner_id`
    pub async fn create_recipe(&self, owner_id: i64, recipe: &NewRecipe) -> Result<Recipe> {
        let row: RecipeRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO recipes (title, description, ingredients, instructions, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECIPE_COLUMNS}
            "#,
        ))
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to create recipe: {e}")))?;

        Ok(row.into())
    }

    /// Get recipe by ID
    pub async fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        let row: Option<RecipeRow> =
            sqlx::query_as(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| CoreError::Database(format!("Failed to fetch recipe: {e}")))?;

        Ok(row.map(Recipe::from))
    }

    /// Browse recipes with optional substring search and offset pagination
    ///
    /// With a query, a recipe matches when its title or description contains
    /// the substring case-insensitively, or its ingredient array contains an
    /// element exactly equal to the query. The three conditions are OR'd.
    /// `limit` is taken as given; no upper bound is enforced here.
    pub async fn search_recipes(
        &self,
        query: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE $1::TEXT IS NULL
               OR title ILIKE '%' || $1 || '%'
               OR description ILIKE '%' || $1 || '%'
               OR $1 = ANY(ingredients)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        ))
        .bind(query)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to search recipes: {e}")))?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Apply a partial update to a recipe
    ///
    /// Only the fields present in the patch are written. An empty patch
    /// skips the UPDATE and returns the current row.
    pub async fn update_recipe(&self, id: i64, patch: &RecipePatch) -> Result<Recipe> {
        if patch.is_empty() {
            return self
                .get_recipe(id)
                .await?
                .ok_or_else(|| CoreError::NotFound("Recipe".to_string()));
        }

        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;
        for (field, present) in [
            ("title", patch.title.is_some()),
            ("description", patch.description.is_some()),
            ("ingredients", patch.ingredients.is_some()),
            ("instructions", patch.instructions.is_some()),
        ] {
            if present {
                sets.push(format!("{field} = ${idx}"));
                idx += 1;
            }
        }

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = $1 RETURNING {RECIPE_COLUMNS}",
            sets.join(", "),
        );

        let mut q = sqlx::query_as::<_, RecipeRow>(&sql).bind(id);
        if let Some(title) = &patch.title {
            q = q.bind(title);
        }
        if let Some(description) = &patch.description {
            q = q.bind(description);
        }
        if let Some(ingredients) = &patch.ingredients {
            q = q.bind(ingredients);
        }
        if let Some(instructions) = &patch.instructions {
            q = q.bind(instructions);
        }

        let row: Option<RecipeRow> = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::Database(format!("Failed to update recipe: {e}")))?;

        row.map(Recipe::from)
            .ok_or_else(|| CoreError::NotFound("Recipe".to_string()))
    }

    /// Delete a recipe
    ///
    /// Favorites rows pointing at the recipe are removed by the foreign
    /// key's ON DELETE CASCADE.
    pub async fn delete_recipe(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::Database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("Recipe".to_string()));
        }

        Ok(())
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Mark a recipe as a favorite of `user_id`
    ///
    /// Idempotent: the composite primary key absorbs duplicate inserts,
    /// including two concurrent adds for the same pair.
    pub async fn add_favorite(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to add favorite: {e}")))?;

        Ok(())
    }

    /// Remove a recipe from the favorites of `user_id`
    ///
    /// Removing a pair that is not present is a no-op.
    pub async fn remove_favorite(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::Database(format!("Failed to remove favorite: {e}")))?;

        Ok(())
    }

    /// Fetch the full favorite-id set of a user
    ///
    /// Handlers call this once per request and annotate a whole result page
    /// against it, keeping the cost linear in page size.
    pub async fn favorite_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT recipe_id FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| CoreError::Database(format!("Failed to fetch favorites: {e}")))?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// List every recipe in a user's favorite set
    pub async fn list_favorites(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.title, r.description, r.ingredients, r.instructions,
                   r.owner_id, r.created_at, r.updated_at
            FROM recipes r
            JOIN favorites f ON f.recipe_id = r.id
            WHERE f.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list favorites: {e}")))?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Store methods are exercised end to end by the API integration tests
    // against a live database. Row conversions are checked here.

    #[test]
    fn test_recipe_row_conversion() {
        let now = Utc::now();
        let row = RecipeRow {
            id: 7,
            title: "Omelet".to_string(),
            description: None,
            ingredients: vec!["egg".to_string(), "salt".to_string()],
            instructions: vec!["whisk".to_string(), "fry".to_string()],
            owner_id: 1,
            created_at: now,
            updated_at: now,
        };

        let recipe = Recipe::from(row);
        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.ingredients, vec!["egg", "salt"]);
        assert!(recipe.description.is_none());
    }
}
