//! Google sign-in flow and session inspection

use crate::{error::Result, models::Session, services::IdentityGate};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    http::header::LOCATION,
    web, HttpRequest, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

const STATE_COOKIE: &str = "oauth_state";
const SIGN_IN_ERROR_PAGE: &str = "/login?error=AccessDenied";

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signin", web::get().to(sign_in))
            .route("/callback/google", web::get().to(callback))
            .route("/signout", web::post().to(sign_out))
            .route("/session", web::get().to(session)),
    );
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(STATE_COOKIE, value)
        .path("/api/auth")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(10))
        .finish()
}

fn removal(name: &str, path: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_string(), "").path(path.to_string()).finish();
    cookie.make_removal();
    cookie
}

fn redirect(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.append_header((LOCATION, location));
    builder
}

/// Start the OAuth flow
pub async fn sign_in(gate: web::Data<IdentityGate>) -> Result<HttpResponse> {
    let state = Uuid::new_v4().to_string();
    let url = gate.authorize_url(&state)?;

    Ok(redirect(&url)
        .cookie(state_cookie(state, gate.secure_cookies()))
        .finish())
}

/// OAuth redirect target: checks `state`, signs the user in and sets the
/// session cookie. Any failure lands on the sign-in error page without a
/// session.
pub async fn callback(
    req: HttpRequest,
    params: web::Query<CallbackParams>,
    gate: web::Data<IdentityGate>,
) -> HttpResponse {
    let params = params.into_inner();
    let expected_state = req.cookie(STATE_COOKIE).map(|c| c.value().to_string());

    if let Some(error) = params.error {
        warn!("[Auth] Provider returned an error: {}", error);
        return redirect(SIGN_IN_ERROR_PAGE)
            .cookie(removal(STATE_COOKIE, "/api/auth"))
            .finish();
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        return redirect(SIGN_IN_ERROR_PAGE).finish();
    };

    if expected_state.as_deref() != Some(state.as_str()) {
        warn!("[Auth] OAuth state mismatch");
        return redirect(SIGN_IN_ERROR_PAGE)
            .cookie(removal(STATE_COOKIE, "/api/auth"))
            .finish();
    }

    match gate.sign_in(&code).await {
        Ok((identity, token)) => {
            info!("[Auth] Signed in {}", identity.id);

            let session_cookie = Cookie::build(gate.cookie_name().to_string(), token)
                .path("/")
                .http_only(true)
                .secure(gate.secure_cookies())
                .same_site(SameSite::Lax)
                .finish();

            redirect("/")
                .cookie(session_cookie)
                .cookie(removal(STATE_COOKIE, "/api/auth"))
                .finish()
        }
        Err(e) => {
            warn!("[Auth] Sign-in failed: {}", e);
            redirect(SIGN_IN_ERROR_PAGE)
                .cookie(removal(STATE_COOKIE, "/api/auth"))
                .finish()
        }
    }
}

pub async fn sign_out(gate: web::Data<IdentityGate>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal(gate.cookie_name(), "/"))
        .json(json!({ "message": "Signed out." }))
}

/// Current caller, as seen by the identity gate
pub async fn session(session: Session) -> HttpResponse {
    match session.identity() {
        Some(identity) => HttpResponse::Ok().json(json!({
            "authenticated": true,
            "user": identity,
        })),
        None => HttpResponse::Ok().json(json!({ "authenticated": false })),
    }
}
