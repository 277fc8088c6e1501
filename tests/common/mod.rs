#![allow(dead_code)]

use actix_web::{web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use recipe_finder_api::{
    error::{ApiError, Result},
    models::{NewSavedRecipe, ProviderProfile, RecipeId, SaveOutcome, SavedRecipeView, UserProfile},
    services::{IdentityGate, IdentityProvider, MemoryStore, SavedRecipeService, Store, TastyClient},
    AppState,
};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

pub const SESSION_COOKIE: &str = "session_token";

/// Accepts tokens of the form `token-<subject>`
#[derive(Default)]
pub struct StubProvider {
    pub lookups: AtomicUsize,
}

impl StubProvider {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://provider.test/auth?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        Ok(format!("token-{}", code))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Option<ProviderProfile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(access_token
            .strip_prefix("token-")
            .map(|subject| ProviderProfile {
                sub: subject.to_string(),
                email: Some(format!("{}@example.com", subject)),
                name: Some(subject.to_string()),
                picture: None,
            }))
    }
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    size: Option<usize>,
    #[serde(default)]
    tags: Option<String>,
}

#[derive(Deserialize)]
struct DetailParams {
    id: String,
}

fn summary(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Recipe {}", id),
        "thumbnail_url": format!("https://img.example.com/{}.jpg", id),
        "cook_time_minutes": 15,
        "num_servings": 2,
        "tags": [],
    })
}

async fn list_recipes(params: web::Query<ListParams>) -> HttpResponse {
    let size = params.size.unwrap_or(20).min(3);
    // Tagged listings start at 10 so tests can tell them apart
    let first = if params.tags.is_some() { 10 } else { 1 };
    let results: Vec<_> = (first..first + size as i64).map(summary).collect();
    HttpResponse::Ok().json(json!({ "count": results.len(), "results": results }))
}

async fn recipe_details(params: web::Query<DetailParams>) -> HttpResponse {
    match params.id.as_str() {
        "1" => HttpResponse::Ok().json(json!({
            "id": 1,
            "name": "Recipe 1",
            "thumbnail_url": "https://img.example.com/1.jpg",
            "tags": [{ "id": 5, "name": "breakfast", "display_name": "Breakfast", "type": "meal" }],
            "instructions": [{ "position": 1, "display_text": "Whisk." }],
        })),
        "404" => HttpResponse::NotFound().finish(),
        _ => HttpResponse::Ok().json(json!({})),
    }
}

async fn list_tags() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "results": [
            { "id": 1, "name": "italian", "display_name": "Italian", "type": "cuisine" },
            { "id": 2, "name": "easy", "display_name": "Easy", "type": "difficulty" },
            { "id": 3, "name": "vegan", "display_name": "Vegan", "type": "dietary" },
        ]
    }))
}

async fn list_feeds() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "results": [
            { "type": "featured", "item": summary(100) },
            { "type": "popular_recipes", "items": [summary(1), summary(2)] },
            { "type": "trending", "item": summary(3) },
            { "type": "carousel", "name": "Quick Bites", "items": [summary(4)] },
        ]
    }))
}

async fn failing() -> HttpResponse {
    HttpResponse::InternalServerError().body("upstream exploded")
}

/// Start a stand-in for the recipe API on a random local port and return
/// its base URL. With `healthy == false` every endpoint answers 500.
pub fn spawn_fake_tasty(healthy: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake upstream");
    let port = listener.local_addr().expect("local addr").port();

    let server = HttpServer::new(move || {
        if healthy {
            App::new()
                .route("/recipes/list", web::get().to(list_recipes))
                .route("/recipes/get-more-info", web::get().to(recipe_details))
                .route("/tags/list", web::get().to(list_tags))
                .route("/feeds/list", web::get().to(list_feeds))
        } else {
            App::new().default_service(web::to(failing))
        }
    })
    .workers(1)
    .listen(listener)
    .expect("listen fake upstream")
    .run();

    actix_web::rt::spawn(server);
    format!("http://127.0.0.1:{}", port)
}

/// Base URL of a port nothing listens on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn tasty_client(base_url: &str) -> TastyClient {
    TastyClient::new(base_url, "test-key", "tasty.p.rapidapi.com", Duration::from_secs(5))
        .expect("tasty client")
}

pub struct TestContext {
    pub state: AppState,
    pub provider: Arc<StubProvider>,
    pub store: Arc<dyn Store>,
}

/// Store whose user table cannot be written
pub struct UserlessStore;

#[async_trait]
impl Store for UserlessStore {
    async fn list_saved(&self, _: &str) -> Result<Vec<SavedRecipeView>> {
        Ok(Vec::new())
    }

    async fn insert_saved(&self, _: NewSavedRecipe) -> Result<SaveOutcome> {
        Ok(SaveOutcome::AlreadySaved)
    }

    async fn delete_saved(&self, _: &str, _: &RecipeId) -> Result<bool> {
        Ok(false)
    }

    async fn delete_saved_many(&self, _: &str, _: &[RecipeId]) -> Result<u64> {
        Ok(0)
    }

    async fn insert_user_if_absent(&self, _: &UserProfile) -> Result<bool> {
        Err(ApiError::DatabaseError("relation \"users\" does not exist".into()))
    }
}

pub fn context(tasty_base_url: &str) -> TestContext {
    context_with_store(tasty_base_url, Arc::new(MemoryStore::new()))
}

pub fn context_with_store(tasty_base_url: &str, store: Arc<dyn Store>) -> TestContext {
    let provider = Arc::new(StubProvider::default());

    let identity = IdentityGate::new(provider.clone(), store.clone(), SESSION_COOKIE, false);
    let state = AppState::new(
        tasty_client(tasty_base_url),
        SavedRecipeService::new(store.clone()),
        identity,
    );

    TestContext {
        state,
        provider,
        store,
    }
}
