use crate::error::{ApiError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a recipe in the upstream catalogue. Clients send it either
/// as a JSON string or a number; it is kept in string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrInt {
            String(String),
            Int(i64),
        }

        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::String(s) => Ok(RecipeId::new(s)),
            StringOrInt::Int(i) => Ok(RecipeId::from(i)),
        }
    }
}

/// Projection returned when listing a user's saved recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipeView {
    pub recipe_id: RecipeId,
    pub title: String,
    pub thumbnail: Option<String>,
}

/// A validated save request
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedRecipe {
    pub user_id: String,
    pub recipe_id: RecipeId,
    pub title: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Uuid),
    /// The (user, recipe) pair was already stored; nothing was written.
    AlreadySaved,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipesQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecipeRequest {
    pub user_id: Option<String>,
    pub recipe_id: Option<RecipeId>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsaveRecipeRequest {
    pub user_id: Option<String>,
    pub recipe_id: Option<RecipeId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUnsaveRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub recipe_ids: Vec<RecipeId>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present_id(value: Option<RecipeId>) -> Option<RecipeId> {
    value.filter(|id| !id.is_empty())
}

impl SaveRecipeRequest {
    pub fn validate(self) -> Result<NewSavedRecipe> {
        let missing =
            || ApiError::InvalidInput("Missing required fields: userId, recipeId, title.".into());

        Ok(NewSavedRecipe {
            user_id: present(self.user_id).ok_or_else(missing)?,
            recipe_id: present_id(self.recipe_id).ok_or_else(missing)?,
            title: present(self.title).ok_or_else(missing)?,
            thumbnail: present(self.thumbnail),
        })
    }
}

impl UnsaveRecipeRequest {
    pub fn validate(self) -> Result<(String, RecipeId)> {
        let missing = || ApiError::InvalidInput("Missing required fields: userId, recipeId.".into());

        Ok((
            present(self.user_id).ok_or_else(missing)?,
            present_id(self.recipe_id).ok_or_else(missing)?,
        ))
    }
}

impl BulkUnsaveRequest {
    pub fn validate(self) -> Result<(String, Vec<RecipeId>)> {
        let missing =
            || ApiError::InvalidInput("Missing required fields: userId, recipeIds.".into());

        let user_id = present(self.user_id).ok_or_else(missing)?;
        let recipe_ids: Vec<RecipeId> = self
            .recipe_ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .collect();

        if recipe_ids.is_empty() {
            return Err(missing());
        }

        Ok((user_id, recipe_ids))
    }
}
