use crate::{
    error::Result,
    models::{BulkUnsaveRequest, SaveOutcome, SaveRecipeRequest, SavedRecipesQuery, UnsaveRecipeRequest},
    services::SavedRecipeService,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

pub fn saved_recipes_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/get-saved-recipes").route(web::get().to(get_saved_recipes)))
        .service(
            web::resource("/save-recipe")
                .route(web::post().to(save_recipe))
                .route(web::delete().to(unsave_recipe)),
        )
        .service(web::resource("/saved-recipes").route(web::delete().to(unsave_recipes)));
}

/// Saved recipes of a user, as `{recipe_id, title, thumbnail}` objects
pub async fn get_saved_recipes(
    params: web::Query<SavedRecipesQuery>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let user_id = params.into_inner().user_id.unwrap_or_default();
    let recipes = saved_recipes.list(&user_id).await?;

    Ok(HttpResponse::Ok().json(recipes))
}

/// Save a recipe. Saving one that is already saved succeeds with 200.
pub async fn save_recipe(
    request: Json<SaveRecipeRequest>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let recipe = request.into_inner().validate()?;

    match saved_recipes.save(recipe).await? {
        SaveOutcome::Created(id) => Ok(HttpResponse::Created().json(json!({
            "message": "Recipe saved successfully.",
            "id": id,
        }))),
        SaveOutcome::AlreadySaved => Ok(HttpResponse::Ok().json(json!({
            "message": "Recipe already saved.",
        }))),
    }
}

pub async fn unsave_recipe(
    request: Json<UnsaveRecipeRequest>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let (user_id, recipe_id) = request.into_inner().validate()?;
    saved_recipes.unsave(&user_id, &recipe_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Recipe removed successfully.",
    })))
}

/// Remove several saved recipes at once
pub async fn unsave_recipes(
    request: Json<BulkUnsaveRequest>,
    saved_recipes: web::Data<SavedRecipeService>,
) -> Result<HttpResponse> {
    let (user_id, recipe_ids) = request.into_inner().validate()?;
    let removed = saved_recipes.unsave_many(&user_id, &recipe_ids).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Recipes removed successfully.",
        "removed": removed,
    })))
}
