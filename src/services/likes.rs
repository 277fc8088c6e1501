//! Marks recipe listings with whether the caller has saved each recipe

use crate::{
    models::{RecipeSummary, SavedRecipeView, Session},
    services::saved_recipes::SavedRecipeService,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::error;

/// A listed recipe plus the caller's saved flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecipe {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    pub saved: bool,
}

/// Recipe ids the caller has saved. Saved ids that are not numeric can never
/// match an upstream recipe and are left out.
#[derive(Debug, Clone, Default)]
pub struct SavedSet {
    ids: HashSet<i64>,
}

impl SavedSet {
    pub fn from_views(saved: &[SavedRecipeView]) -> Self {
        Self {
            ids: saved
                .iter()
                .filter_map(|view| view.recipe_id.as_str().parse::<i64>().ok())
                .collect(),
        }
    }

    pub fn contains(&self, recipe_id: i64) -> bool {
        self.ids.contains(&recipe_id)
    }

    pub fn annotate(&self, recipes: Vec<RecipeSummary>) -> Vec<AnnotatedRecipe> {
        recipes
            .into_iter()
            .map(|recipe| AnnotatedRecipe {
                saved: self.contains(recipe.id),
                recipe,
            })
            .collect()
    }
}

/// Saved set of the caller. Anonymous callers get an empty set without the
/// store being asked; a store failure also yields an empty set so listings
/// still render.
pub async fn load_saved_set(session: &Session, saved_recipes: &SavedRecipeService) -> SavedSet {
    let Some(user_id) = session.user_id() else {
        return SavedSet::default();
    };

    match saved_recipes.list(user_id).await {
        Ok(saved) => SavedSet::from_views(&saved),
        Err(e) => {
            error!("Error fetching saved recipes for {}: {}", user_id, e);
            SavedSet::default()
        }
    }
}
