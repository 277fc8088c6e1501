use crate::{
    error::{ApiError, Result},
    models::{NewSavedRecipe, RecipeId, SaveOutcome, SavedRecipeView},
    services::store::Store,
};
use std::sync::Arc;
use tracing::{error, info};

/// Saved-recipe operations over whichever store is configured
#[derive(Clone)]
pub struct SavedRecipeService {
    store: Arc<dyn Store>,
}

fn require_user(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::InvalidInput(
            "Missing required parameter: userId.".to_string(),
        ));
    }
    Ok(user_id)
}

impl SavedRecipeService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<SavedRecipeView>> {
        let user_id = require_user(user_id)?;

        self.store.list_saved(user_id).await.map_err(|e| {
            error!("Failed to list saved recipes for {}: {}", user_id, e);
            e
        })
    }

    pub async fn save(&self, recipe: NewSavedRecipe) -> Result<SaveOutcome> {
        let user_id = recipe.user_id.clone();
        let recipe_id = recipe.recipe_id.clone();

        let outcome = self.store.insert_saved(recipe).await.map_err(|e| {
            error!("Failed to save recipe {} for {}: {}", recipe_id, user_id, e);
            e
        })?;

        if let SaveOutcome::Created(id) = outcome {
            info!("Saved recipe {} for {} as {}", recipe_id, user_id, id);
        }

        Ok(outcome)
    }

    pub async fn unsave(&self, user_id: &str, recipe_id: &RecipeId) -> Result<()> {
        let user_id = require_user(user_id)?;

        let removed = self
            .store
            .delete_saved(user_id, recipe_id)
            .await
            .map_err(|e| {
                error!("Failed to remove recipe {} for {}: {}", recipe_id, user_id, e);
                e
            })?;

        if !removed {
            return Err(ApiError::NotFound("Recipe not found.".to_string()));
        }

        info!("Removed recipe {} for {}", recipe_id, user_id);
        Ok(())
    }

    pub async fn unsave_many(&self, user_id: &str, recipe_ids: &[RecipeId]) -> Result<u64> {
        let user_id = require_user(user_id)?;
        if recipe_ids.is_empty() {
            return Err(ApiError::InvalidInput(
                "Missing required fields: userId, recipeIds.".to_string(),
            ));
        }

        let removed = self
            .store
            .delete_saved_many(user_id, recipe_ids)
            .await
            .map_err(|e| {
                error!("Failed to remove recipes for {}: {}", user_id, e);
                e
            })?;

        info!("Removed {} saved recipes for {}", removed, user_id);
        Ok(removed)
    }
}
