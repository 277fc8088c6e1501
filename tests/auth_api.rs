mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test, App};
use recipe_finder_api::models::UserProfile;
use serde_json::{json, Value};
use std::sync::Arc;

macro_rules! app {
    ($ctx:expr) => {{
        let state = $ctx.state.clone();
        test::init_service(App::new().configure(move |cfg| state.configure(cfg))).await
    }};
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn sign_in_redirects_with_a_state_cookie() {
    let ctx = common::context(&common::closed_port_url());
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/auth/signin").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let state = resp
        .response()
        .cookies()
        .find(|c| c.name() == "oauth_state")
        .map(|c| c.value().to_string())
        .expect("state cookie");
    assert_eq!(location(&resp), format!("https://provider.test/auth?state={}", state));
}

#[actix_web::test]
async fn callback_sets_the_session_cookie() {
    let ctx = common::context(&common::closed_port_url());
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/auth/callback/google?code=alice&state=s1")
        .cookie(Cookie::new("oauth_state", "s1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == common::SESSION_COOKIE)
        .expect("session cookie");
    assert_eq!(session.value(), "token-alice");
    assert_eq!(session.http_only(), Some(true));

    let profile = UserProfile {
        email: "alice@example.com".into(),
        name: Some("alice".into()),
        image: None,
    };
    assert!(!ctx.store.insert_user_if_absent(&profile).await.unwrap());
}

#[actix_web::test]
async fn callback_is_denied_when_the_user_cannot_be_recorded() {
    let ctx =
        common::context_with_store(&common::closed_port_url(), Arc::new(common::UserlessStore));
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/auth/callback/google?code=alice&state=s1")
        .cookie(Cookie::new("oauth_state", "s1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?error=AccessDenied");
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != common::SESSION_COOKIE));
}

#[actix_web::test]
async fn callback_with_wrong_state_is_denied() {
    let ctx = common::context(&common::closed_port_url());
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/auth/callback/google?code=alice&state=forged")
        .cookie(Cookie::new("oauth_state", "s1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?error=AccessDenied");
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != common::SESSION_COOKIE));
}

#[actix_web::test]
async fn session_endpoint_reports_the_caller() {
    let ctx = common::context(&common::closed_port_url());
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "authenticated": false }));

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .cookie(Cookie::new(common::SESSION_COOKIE, "token-alice"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["id"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[actix_web::test]
async fn sign_out_clears_the_cookie() {
    let ctx = common::context(&common::closed_port_url());
    let app = app!(ctx);

    let req = test::TestRequest::post().uri("/api/auth/signout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == common::SESSION_COOKIE)
        .expect("removal cookie");
    assert_eq!(cleared.value(), "");
}
