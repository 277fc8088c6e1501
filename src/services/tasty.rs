use crate::{
    error::{ApiError, Result},
    models::{FeedList, FeedSection, HomeData, RecipeDetails, RecipeList, RecipeSummary, TagList},
    services::upstream::{Upstream, UpstreamError},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parameters of a `recipes/list` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeQuery {
    pub tag: Option<String>,
    pub query: Option<String>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            tag: None,
            query: None,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RecipeQuery {
    pub fn tagged(tag: &str, offset: u32, limit: u32) -> Self {
        Self {
            tag: Some(tag.to_string()),
            offset,
            limit,
            ..Self::default()
        }
    }

    pub fn search(query: &str, limit: u32) -> Self {
        Self {
            query: Some(query.to_string()),
            limit,
            ..Self::default()
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("from", self.offset.to_string()),
            ("size", self.limit.to_string()),
        ];

        if let Some(tag) = self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            params.push(("tags", tag.to_string()));
        }
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", query.to_string()));
        }

        params
    }
}

/// Read-only client for the Tasty recipe API (served through RapidAPI)
#[derive(Debug, Clone)]
pub struct TastyClient {
    client: Client,
    base_url: String,
}

impl TastyClient {
    pub fn new(base_url: &str, api_key: &str, api_host: &str, timeout: Duration) -> Result<Self> {
        let header = |value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| ApiError::ConfigError(format!("Invalid Tasty credential: {}", e)))
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-rapidapi-key", header(api_key)?);
        headers.insert("x-rapidapi-host", header(api_host)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Upstream<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, params);

        let response = match self.client.get(&url).query(params).send().await {
            Ok(response) => response,
            Err(e) => return Upstream::Unavailable(UpstreamError::Transport(e.to_string())),
        };

        match response.status() {
            StatusCode::NOT_FOUND => return Upstream::Missing,
            status if !status.is_success() => {
                return Upstream::Unavailable(UpstreamError::Status(status.as_u16()))
            }
            _ => {}
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return Upstream::Unavailable(UpstreamError::Decode(e.to_string())),
        };

        let empty = match &body {
            serde_json::Value::Null => true,
            serde_json::Value::Object(fields) => fields.is_empty(),
            _ => false,
        };
        if empty {
            return Upstream::Missing;
        }

        match serde_json::from_value(body) {
            Ok(value) => Upstream::Fetched(value),
            Err(e) => Upstream::Unavailable(UpstreamError::Decode(e.to_string())),
        }
    }

    /// List or search recipes. Callers degrade to an empty list on any
    /// non-fetched outcome.
    pub async fn list_recipes(&self, query: &RecipeQuery) -> Upstream<Vec<RecipeSummary>> {
        self.get_json::<RecipeList>("/recipes/list", &query.params())
            .await
            .map(|list| list.results)
            .logged("recipes/list")
    }

    /// Fetch one recipe. Only a missing id is an error; everything the
    /// upstream does wrong is reported through [`Upstream`].
    pub async fn get_recipe_details(&self, id: &str) -> Result<Upstream<RecipeDetails>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidInput(
                "Recipe ID is required to fetch details.".to_string(),
            ));
        }

        Ok(self
            .get_json::<RecipeDetails>("/recipes/get-more-info", &[("id", id.to_string())])
            .await
            .logged("recipes/get-more-info"))
    }

    pub async fn list_tags(&self) -> Upstream<TagList> {
        self.get_json::<TagList>("/tags/list", &[])
            .await
            .logged("tags/list")
    }

    pub async fn list_feeds(&self) -> Upstream<Vec<FeedSection>> {
        self.get_json::<FeedList>("/feeds/list", &[])
            .await
            .map(|feeds| feeds.results)
            .logged("feeds/list")
    }

    /// Home page listings; all empty when the feeds cannot be fetched
    pub async fn get_preloaded_home_data(&self) -> HomeData {
        self.list_feeds()
            .await
            .into_option()
            .map(HomeData::from_feeds)
            .unwrap_or_default()
    }
}
