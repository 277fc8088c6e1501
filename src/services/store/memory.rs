use super::Store;
use crate::{
    error::Result,
    models::{NewSavedRecipe, RecipeId, SaveOutcome, SavedRecipeView, UserProfile},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct SavedRecipeRecord {
    user_id: String,
    recipe_id: RecipeId,
    title: String,
    thumbnail: Option<String>,
}

#[derive(Default)]
struct State {
    /// Insertion ordered
    saved: Vec<SavedRecipeRecord>,
    users: HashMap<String, UserProfile>,
}

/// Process-local store. The uniqueness check and the insert happen under
/// one lock, so concurrent saves of the same pair cannot both succeed.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedRecipeView>> {
        let state = self.state.lock().await;

        Ok(state
            .saved
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| SavedRecipeView {
                recipe_id: record.recipe_id.clone(),
                title: record.title.clone(),
                thumbnail: record.thumbnail.clone(),
            })
            .collect())
    }

    async fn insert_saved(&self, recipe: NewSavedRecipe) -> Result<SaveOutcome> {
        let mut state = self.state.lock().await;

        let exists = state
            .saved
            .iter()
            .any(|r| r.user_id == recipe.user_id && r.recipe_id == recipe.recipe_id);
        if exists {
            return Ok(SaveOutcome::AlreadySaved);
        }

        state.saved.push(SavedRecipeRecord {
            user_id: recipe.user_id,
            recipe_id: recipe.recipe_id,
            title: recipe.title,
            thumbnail: recipe.thumbnail,
        });

        Ok(SaveOutcome::Created(Uuid::new_v4()))
    }

    async fn delete_saved(&self, user_id: &str, recipe_id: &RecipeId) -> Result<bool> {
        let mut state = self.state.lock().await;

        let position = state
            .saved
            .iter()
            .position(|r| r.user_id == user_id && &r.recipe_id == recipe_id);

        match position {
            Some(index) => {
                state.saved.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_saved_many(&self, user_id: &str, recipe_ids: &[RecipeId]) -> Result<u64> {
        let mut state = self.state.lock().await;

        let before = state.saved.len();
        state
            .saved
            .retain(|r| !(r.user_id == user_id && recipe_ids.contains(&r.recipe_id)));

        Ok((before - state.saved.len()) as u64)
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<bool> {
        let mut state = self.state.lock().await;

        if state.users.contains_key(&profile.email) {
            return Ok(false);
        }

        state.users.insert(profile.email.clone(), profile.clone());
        Ok(true)
    }
}
