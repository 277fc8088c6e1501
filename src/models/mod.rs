pub use recipe::{
    Category, Component, FeedList, FeedSection, HomeData, HomeSection, IngredientSection,
    Instruction, Nutrition, RecipeDetails, RecipeList, RecipeSummary, Tag, TagList, UserRatings,
};
pub use saved_recipe::{
    BulkUnsaveRequest, NewSavedRecipe, RecipeId, SaveOutcome, SaveRecipeRequest,
    SavedRecipeView, SavedRecipesQuery, UnsaveRecipeRequest,
};
pub use session::{Identity, ProviderProfile, Session, UserProfile};

mod recipe;
mod saved_recipe;
mod session;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};

/// Deserialize a list, dropping entries that do not match `T` instead of
/// failing the whole payload. A `null` or missing list becomes empty.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = values.len();

    let items: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if items.len() < total {
        tracing::debug!(
            "Dropped {} malformed upstream entries out of {}",
            total - items.len(),
            total
        );
    }

    Ok(items)
}

/// Like [`lenient_vec`], but keeps the difference between an absent list and
/// an empty one.
pub(crate) fn lenient_opt_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }))
}

/// Deserialize a single optional entry, treating a malformed one as absent.
pub(crate) fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}
