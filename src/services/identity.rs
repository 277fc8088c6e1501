//! Session/identity gate backed by Google OAuth2
//!
//! The session token is the provider access token, carried in the session
//! cookie or an `Authorization: Bearer` header. Resolving it costs one
//! provider round-trip, so the result is memoized in the request extensions.

use crate::{
    error::{ApiError, Result},
    models::{Identity, ProviderProfile, Session, UserProfile},
    services::store::Store,
};
use actix_web::{
    dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures::future::{ready, LocalBoxFuture};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page the browser is sent to
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Trade an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// Profile behind an access token; `None` when the provider rejects it
    async fn fetch_profile(&self, access_token: &str) -> Result<Option<ProviderProfile>>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleProvider {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_url: redirect_url.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )
        .map_err(|e| ApiError::InternalError(format!("Invalid authorize URL: {}", e)))?;

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::AuthenticationError(format!(
                "Token exchange rejected with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Option<ProviderProfile>> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(ApiError::ExternalServiceError(format!(
                "Userinfo request failed with status {}",
                status
            ))),
        }
    }
}

/// Resolves callers and signs users in
#[derive(Clone)]
pub struct IdentityGate {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn Store>,
    cookie_name: String,
    secure_cookies: bool,
}

impl IdentityGate {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn Store>,
        cookie_name: &str,
        secure_cookies: bool,
    ) -> Self {
        Self {
            provider,
            store,
            cookie_name: cookie_name.to_string(),
            secure_cookies,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn authorize_url(&self, state: &str) -> Result<String> {
        self.provider.authorize_url(state)
    }

    /// Session token from the session cookie, else from a bearer header
    pub fn token_from_request(&self, req: &HttpRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(&self.cookie_name) {
            let value = cookie.value().trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        req.headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Resolve a session token into a session. Anything short of a valid
    /// token is anonymous.
    pub async fn resolve(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::Anonymous;
        };

        match self.provider.fetch_profile(token).await {
            Ok(Some(profile)) => Session::Authenticated(Identity::from(profile)),
            Ok(None) => Session::Anonymous,
            Err(e) => {
                warn!("Could not resolve session, treating caller as anonymous: {}", e);
                Session::Anonymous
            }
        }
    }

    /// Complete an OAuth callback. Returns the identity and the session
    /// token to hand back to the browser. Sign-in is denied when the profile
    /// cannot be recorded.
    pub async fn sign_in(&self, code: &str) -> Result<(Identity, String)> {
        let token = self.provider.exchange_code(code).await?;

        let profile = self
            .provider
            .fetch_profile(&token)
            .await?
            .ok_or_else(|| ApiError::AuthenticationError("Provider rejected new token".into()))?;

        let email = profile
            .email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| ApiError::AuthenticationError("Provider profile has no email".into()))?;

        let user = UserProfile {
            email,
            name: profile.name.clone(),
            image: profile.picture.clone(),
        };

        match self.store.insert_user_if_absent(&user).await {
            Ok(true) => info!("[Auth] New user added to the database."),
            Ok(false) => {}
            Err(e) => {
                error!("[Auth] Sign-in error: {}", e);
                return Err(ApiError::AuthenticationError("Sign-in denied".into()));
            }
        }

        Ok((Identity::from(profile), token))
    }
}

impl Session {
    /// Resolve the caller of `req`, reusing the result when this request
    /// already resolved it
    pub async fn resolve(req: &HttpRequest) -> Result<Session> {
        if let Some(session) = req.extensions().get::<Session>() {
            return Ok(session.clone());
        }

        let gate = req
            .app_data::<web::Data<IdentityGate>>()
            .cloned()
            .ok_or_else(|| ApiError::InternalError("Identity gate is not configured".into()))?;

        let token = gate.token_from_request(req);
        let session = gate.resolve(token.as_deref()).await;

        req.extensions_mut().insert(session.clone());
        Ok(session)
    }
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(session) = req.extensions().get::<Session>() {
            return Box::pin(ready(Ok(session.clone())));
        }

        let req = req.clone();
        Box::pin(async move { Session::resolve(&req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{NewSavedRecipe, RecipeId, SaveOutcome, SavedRecipeView},
        services::store::MemoryStore,
    };
    use actix_web::{cookie::Cookie, test::TestRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        lookups: AtomicUsize,
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
            Ok(access_token.starts_with("token-").then(|| ProviderProfile {
                sub: "sub-1".into(),
                email: Some("cook@example.com".into()),
                name: Some("Cook".into()),
                picture: None,
            }))
        }
    }

    struct BrokenUserStore;

    #[async_trait]
    impl Store for BrokenUserStore {
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
            Err(ApiError::DatabaseError("users table is gone".into()))
        }
    }

    fn stub_provider() -> Arc<StubProvider> {
        Arc::new(StubProvider {
            lookups: AtomicUsize::new(0),
        })
    }

    fn gate_with_store(store: Arc<dyn Store>) -> (IdentityGate, Arc<StubProvider>) {
        let provider = stub_provider();
        let gate = IdentityGate::new(provider.clone(), store, "session_token", false);
        (gate, provider)
    }

    fn gate() -> (IdentityGate, Arc<StubProvider>) {
        gate_with_store(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn token_prefers_cookie_over_bearer_header() {
        let (gate, _) = gate();
        let req = TestRequest::default()
            .cookie(Cookie::new("session_token", "from-cookie"))
            .insert_header((AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(gate.token_from_request(&req).as_deref(), Some("from-cookie"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(gate.token_from_request(&req).as_deref(), Some("from-header"));
    }

    #[actix_web::test]
    async fn no_token_means_anonymous_without_provider_call() {
        let (gate, provider) = gate();
        assert_eq!(gate.resolve(None).await, Session::Anonymous);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn rejected_token_is_anonymous() {
        let (gate, _) = gate();
        assert_eq!(gate.resolve(Some("expired")).await, Session::Anonymous);
    }

    #[actix_web::test]
    async fn session_is_resolved_once_per_request() {
        let (gate, provider) = gate();
        let req = TestRequest::default()
            .app_data(web::Data::new(gate))
            .cookie(Cookie::new("session_token", "token-abc"))
            .to_http_request();

        let first = Session::resolve(&req).await.unwrap();
        let second = Session::extract(&req).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.user_id(), Some("sub-1"));
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn sign_in_records_the_user() {
        let store = Arc::new(MemoryStore::new());
        let (gate, _) = gate_with_store(store.clone());

        let (identity, token) = gate.sign_in("abc").await.unwrap();
        assert_eq!(identity.id, "sub-1");
        assert_eq!(token, "token-abc");

        let profile = UserProfile {
            email: "cook@example.com".into(),
            name: Some("Cook".into()),
            image: None,
        };
        assert!(!store.insert_user_if_absent(&profile).await.unwrap());
    }

    #[actix_web::test]
    async fn sign_in_is_denied_when_the_user_cannot_be_recorded() {
        let (gate, _) = gate_with_store(Arc::new(BrokenUserStore));

        let result = gate.sign_in("abc").await;
        assert!(matches!(result, Err(ApiError::AuthenticationError(_))));
    }
}
