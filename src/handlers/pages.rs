//! Page data: upstream listings merged with the caller's saved recipes

use crate::{
    error::{ApiError, Result},
    models::{Category, HomeSection, RecipeDetails, Session},
    services::{
        likes::{load_saved_set, AnnotatedRecipe},
        tasty::{RecipeQuery, DEFAULT_PAGE_SIZE},
        SavedRecipeService, TastyClient,
    },
};
use actix_web::{web, HttpResponse};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;

const MAX_PAGE_SIZE: u32 = 60;
const SUGGESTION_COUNT: u32 = 5;
const RELATED_COUNT: u32 = 6;

/// Trailing numeric id of a `slug-id` path segment
static RECIPE_SLUG_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|-)(\d+)$").expect("valid recipe id pattern"));

pub fn pages_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/home", web::get().to(home))
        .route("/search", web::get().to(search))
        .route("/suggestions", web::get().to(suggestions))
        .route("/categories/{category}", web::get().to(category))
        .route("/recipes/{id}", web::get().to(recipe_details))
        .route("/my-recipes", web::get().to(my_recipes));
}

/// Numeric recipe id from `chicken-tikka-1234` or `1234`
pub fn recipe_id_from_slug(slug: &str) -> Option<&str> {
    RECIPE_SLUG_ID
        .captures(slug.trim())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: u32,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AnnotatedSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub recipes: Vec<AnnotatedRecipe>,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub popular: Vec<AnnotatedRecipe>,
    pub trending: Vec<AnnotatedRecipe>,
    pub other: Vec<AnnotatedSection>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: String,
    pub offset: u32,
    pub next_offset: Option<u32>,
    pub recipes: Vec<AnnotatedRecipe>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub recipe: RecipeDetails,
    pub saved: bool,
    pub related: Vec<AnnotatedRecipe>,
    pub categories: Vec<Category>,
}

pub async fn home(
    session: Session,
    tasty: web::Data<TastyClient>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let (home, tags, saved) = futures::join!(
        tasty.get_preloaded_home_data(),
        tasty.list_tags(),
        load_saved_set(&session, &saved_recipes)
    );

    let other = home
        .other
        .into_iter()
        .map(|section: HomeSection| AnnotatedSection {
            kind: section.kind,
            name: section.name,
            recipes: saved.annotate(section.recipes),
        })
        .collect();

    Ok(HttpResponse::Ok().json(HomePage {
        popular: saved.annotate(home.popular),
        trending: saved.annotate(home.trending),
        other,
        categories: tags.unwrap_or_default().categories(),
    }))
}

pub async fn search(
    params: web::Query<SearchParams>,
    session: Session,
    tasty: web::Data<TastyClient>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let query = params.into_inner().query;
    let recipe_query = RecipeQuery::search(&query, DEFAULT_PAGE_SIZE);

    let (recipes, tags, saved) = futures::join!(
        tasty.list_recipes(&recipe_query),
        tasty.list_tags(),
        load_saved_set(&session, &saved_recipes)
    );

    Ok(HttpResponse::Ok().json(json!({
        "query": query,
        "recipes": saved.annotate(recipes.unwrap_or_default()),
        "categories": tags.unwrap_or_default().categories(),
    })))
}

/// Search-as-you-type suggestions
pub async fn suggestions(
    params: web::Query<SearchParams>,
    tasty: web::Data<TastyClient>,
) -> Result<HttpResponse> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({ "recipes": [] })));
    }

    let recipes = tasty
        .list_recipes(&RecipeQuery::search(query, SUGGESTION_COUNT))
        .await
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(json!({ "recipes": recipes })))
}

pub async fn category(
    path: web::Path<String>,
    params: web::Query<PageParams>,
    session: Session,
    tasty: web::Data<TastyClient>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let category = path.into_inner();
    let offset = params.offset;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let recipe_query = RecipeQuery::tagged(&category, offset, limit);

    let (recipes, tags, saved) = futures::join!(
        tasty.list_recipes(&recipe_query),
        tasty.list_tags(),
        load_saved_set(&session, &saved_recipes)
    );
    let recipes = recipes.unwrap_or_default();

    let returned = recipes.len() as u32;
    // No next page once the offset can no longer advance
    let next_offset = (returned >= limit)
        .then(|| offset.checked_add(returned))
        .flatten();

    Ok(HttpResponse::Ok().json(CategoryPage {
        category,
        offset,
        next_offset,
        recipes: saved.annotate(recipes),
        categories: tags.unwrap_or_default().categories(),
    }))
}

pub async fn recipe_details(
    path: web::Path<String>,
    session: Session,
    tasty: web::Data<TastyClient>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let id = recipe_id_from_slug(&slug).unwrap_or_default();

    let (details, saved) = futures::join!(
        tasty.get_recipe_details(id),
        load_saved_set(&session, &saved_recipes)
    );

    let recipe = details?
        .into_option()
        .ok_or_else(|| ApiError::NotFound("Recipe not found.".to_string()))?;

    let related_query = recipe
        .primary_tag()
        .map(|tag| RecipeQuery::tagged(tag, 0, RELATED_COUNT));

    let related = async {
        match &related_query {
            Some(query) => tasty.list_recipes(query).await.unwrap_or_default(),
            None => Vec::new(),
        }
    };
    let (related, tags) = futures::join!(related, tasty.list_tags());

    Ok(HttpResponse::Ok().json(RecipePage {
        saved: saved.contains(recipe.id),
        related: saved.annotate(related),
        categories: tags.unwrap_or_default().categories(),
        recipe,
    }))
}

/// Saved recipes of the signed-in caller
pub async fn my_recipes(
    session: Session,
    tasty: web::Data<TastyClient>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let user_id = session
        .user_id()
        .ok_or_else(|| ApiError::AuthenticationError("Sign in to see your saved recipes.".into()))?;

    let (recipes, tags) = futures::join!(saved_recipes.list(user_id), tasty.list_tags());

    Ok(HttpResponse::Ok().json(json!({
        "recipes": recipes?,
        "categories": tags.unwrap_or_default().categories(),
    })))
}
