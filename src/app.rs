use crate::{
    config::Config,
    error::{ApiError, Result},
    routes::api_routes,
    services::{store, GoogleProvider, IdentityGate, SavedRecipeService, TastyClient},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::{net::TcpListener, sync::Arc, time::Duration};

/// Collaborators shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub tasty: web::Data<TastyClient>,
    pub saved_recipes: web::Data<SavedRecipeService>,
    pub identity: web::Data<IdentityGate>,
}

impl AppState {
    pub fn new(tasty: TastyClient, saved_recipes: SavedRecipeService, identity: IdentityGate) -> Self {
        Self {
            tasty: web::Data::new(tasty),
            saved_recipes: web::Data::new(saved_recipes),
            identity: web::Data::new(identity),
        }
    }

    /// Build every collaborator from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        let store = store::connect(config).await?;

        let tasty = TastyClient::new(
            &config.tasty_base_url,
            &config.tasty_api_key,
            &config.tasty_api_host,
            timeout,
        )?;

        let provider = GoogleProvider::new(
            &config.google_client_id,
            &config.google_client_secret,
            &config.oauth_redirect_url(),
            timeout,
        )?;

        let identity = IdentityGate::new(
            Arc::new(provider),
            store.clone(),
            &config.session_cookie_name,
            config.secure_cookies,
        );

        Ok(Self::new(tasty, SavedRecipeService::new(store), identity))
    }

    /// Register app data, extractor configuration and routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.tasty.clone())
            .app_data(self.saved_recipes.clone())
            .app_data(self.identity.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::InvalidInput(format!("Invalid request body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::InvalidInput(format!("Invalid query string: {}", err)).into()
            }))
            .service(api_routes());
    }
}

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        // Always bind to 0.0.0.0 for container deployments
        let bind_address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let state = AppState::from_config(&self.config).await?;

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .configure(|cfg| state.configure(cfg))
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
