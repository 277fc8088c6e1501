//! Persistence for saved recipes and user profiles
//!
//! The (user, recipe) uniqueness of saved recipes is enforced by each driver
//! at the storage layer; callers never check for existence before inserting.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::{
    config::Config,
    error::Result,
    models::{NewSavedRecipe, RecipeId, SaveOutcome, SavedRecipeView, UserProfile},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[async_trait]
pub trait Store: Send + Sync {
    /// Saved recipes of a user, oldest first
    async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedRecipeView>>;

    /// Insert a saved recipe, reporting an existing (user, recipe) pair as
    /// [`SaveOutcome::AlreadySaved`]
    async fn insert_saved(&self, recipe: NewSavedRecipe) -> Result<SaveOutcome>;

    /// Returns whether a record was removed
    async fn delete_saved(&self, user_id: &str, recipe_id: &RecipeId) -> Result<bool>;

    /// Returns the number of records removed
    async fn delete_saved_many(&self, user_id: &str, recipe_ids: &[RecipeId]) -> Result<u64>;

    /// Insert the profile unless one with the same email exists. Returns
    /// whether a new record was created.
    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool>;
}

/// Open the store selected by the configuration
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    match config.database_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            let store = PostgresStore::connect(url, config.database_max_connections).await?;
            Ok(Arc::new(store))
        }
        _ => {
            warn!("DATABASE_URL is not set, saved recipes are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
