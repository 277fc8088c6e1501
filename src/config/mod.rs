use crate::error::{ApiError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub tasty_api_key: String,
    pub tasty_api_host: String,
    pub tasty_base_url: String,
    pub upstream_timeout_secs: u64,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub public_base_url: String,
    pub session_cookie_name: String,
    pub secure_cookies: bool,
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present)
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config: Config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("database_max_connections", 5)?
            .set_default("tasty_api_host", "tasty.p.rapidapi.com")?
            .set_default("tasty_base_url", "https://tasty.p.rapidapi.com")?
            .set_default("upstream_timeout_secs", 10)?
            .set_default("public_base_url", "http://localhost:3000")?
            .set_default("session_cookie_name", "session_token")?
            .set_default("secure_cookies", false)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("TASTY_API_KEY", &self.tasty_api_key),
            ("GOOGLE_CLIENT_ID", &self.google_client_id),
            ("GOOGLE_CLIENT_SECRET", &self.google_client_secret),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::ConfigError(format!("{} must be set", key)));
            }
        }

        Ok(())
    }

    /// Redirect URI registered with the OAuth provider
    pub fn oauth_redirect_url(&self) -> String {
        format!(
            "{}/api/auth/callback/google",
            self.public_base_url.trim_end_matches('/')
        )
    }
}
