use super::Store;
use crate::{
    error::{ApiError, Result},
    models::{NewSavedRecipe, RecipeId, SaveOutcome, SavedRecipeView, UserProfile},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS saved_recipes (
        seq BIGSERIAL PRIMARY KEY,
        id UUID NOT NULL,
        user_id TEXT NOT NULL,
        recipe_id TEXT NOT NULL,
        title TEXT NOT NULL,
        thumbnail TEXT,
        saved_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS saved_recipes_user_recipe_idx
        ON saved_recipes (user_id, recipe_id)",
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT,
        image TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )",
];

#[derive(FromRow)]
struct SavedRecipeRow {
    recipe_id: String,
    title: String,
    thumbnail: Option<String>,
}

impl From<SavedRecipeRow> for SavedRecipeView {
    fn from(row: SavedRecipeRow) -> Self {
        Self {
            recipe_id: RecipeId::new(row.recipe_id),
            title: row.title,
            thumbnail: row.thumbnail,
        }
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to Postgres");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to connect: {}", e)))?;

        let store = Self { pool };
        store.setup_schema().await?;

        info!("Postgres store ready");
        Ok(store)
    }

    /// Create tables and the (user_id, recipe_id) unique index
    pub async fn setup_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedRecipeView>> {
        let rows: Vec<SavedRecipeRow> = sqlx::query_as(
            "SELECT recipe_id, title, thumbnail FROM saved_recipes
             WHERE user_id = $1 ORDER BY seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedRecipeView::from).collect())
    }

    async fn insert_saved(&self, recipe: NewSavedRecipe) -> Result<SaveOutcome> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO saved_recipes (id, user_id, recipe_id, title, thumbnail, saved_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&recipe.user_id)
        .bind(recipe.recipe_id.as_str())
        .bind(&recipe.title)
        .bind(&recipe.thumbnail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(SaveOutcome::Created(id)),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                debug!(
                    "Recipe {} already saved for user {}",
                    recipe.recipe_id, recipe.user_id
                );
                Ok(SaveOutcome::AlreadySaved)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_saved(&self, user_id: &str, recipe_id: &RecipeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_saved_many(&self, user_id: &str, recipe_ids: &[RecipeId]) -> Result<u64> {
        let ids: Vec<String> = recipe_ids.iter().map(|id| id.as_str().to_string()).collect();

        let result =
            sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = ANY($2)")
                .bind(user_id)
                .bind(ids)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, image, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs against a scratch database: TEST_DATABASE_URL=postgres://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn unique_index_turns_duplicate_saves_into_already_saved() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let store = PostgresStore::connect(&url, 2).await.unwrap();
        let user_id = format!("pg-test-{}", Uuid::new_v4());

        let recipe = NewSavedRecipe {
            user_id: user_id.clone(),
            recipe_id: RecipeId::from(8123),
            title: "Chicken Tikka".into(),
            thumbnail: None,
        };

        let (first, second) = tokio::join!(
            store.insert_saved(recipe.clone()),
            store.insert_saved(recipe.clone())
        );
        let outcomes = [first.unwrap(), second.unwrap()];
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, SaveOutcome::Created(_)))
                .count(),
            1
        );
        assert!(outcomes.contains(&SaveOutcome::AlreadySaved));
        assert_eq!(store.list_saved(&user_id).await.unwrap().len(), 1);

        assert!(store
            .delete_saved(&user_id, &recipe.recipe_id)
            .await
            .unwrap());
    }
}
