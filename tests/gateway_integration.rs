use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use mockito::{Matcher, Server};
use serde_json::{Value, json};
use sessiongate::config::{Config, ConfigV1};
use sessiongate::guard::ProtectedPaths;
use sessiongate::metrics::Metrics;
use sessiongate::routes::create_router;
use sessiongate::state::AppState;
use sessiongate::verifier::{SessionCache, create_verifier};
use tower::ServiceExt;

const TEST_SECRET: &str = "gateway-test-secret";
const FUTURE_EXP: i64 = 4_102_444_800; // Far in the future to avoid flakiness.

fn build_config(upstream_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "warn"
  format: "json"
bind_address: 127.0.0.1:8084
upstream:
  base_url: "{upstream_url}"
verifier:
  secret: "{TEST_SECRET}"
"#
    );

    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse integration test config");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>) {
    let config = Arc::new(config);
    let sessions = Arc::new(SessionCache::new(create_verifier(&config.verifier)));
    let protected = Arc::new(
        ProtectedPaths::new(&config.guard.protected_paths)
            .expect("guard patterns should compile"),
    );
    let metrics = Metrics::new();

    let state = AppState {
        config: config.clone(),
        sessions,
        protected,
        metrics,
        upstream: reqwest::Client::new(),
    };

    (create_router(state), config)
}

fn with_connect_info(mut request: Request<Body>) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            0,
        )));
    request
}

fn bare_request(path: &str, method: Method) -> Request<Body> {
    with_connect_info(
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("failed to build request"),
    )
}

fn bearer_request(path: &str, token: &str, method: Method) -> Request<Body> {
    with_connect_info(
        Request::builder()
            .method(method)
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .expect("failed to build request"),
    )
}

fn cookie_request(path: &str, token: &str, method: Method) -> Request<Body> {
    with_connect_info(
        Request::builder()
            .method(method)
            .uri(path)
            .header("Cookie", format!("token={}", token))
            .body(Body::empty())
            .expect("failed to build request"),
    )
}

fn json_request(path: &str, body: Value) -> Request<Body> {
    with_connect_info(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
}

fn mint_token(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .expect("Failed to encode JWT")
}

fn identity_claims(role: &str) -> Value {
    json!({
        "id": "u-1",
        "firstName": "Ada",
        "email": "ada@example.com",
        "role": role,
        "exp": FUTURE_EXP,
    })
}

fn fresh_token(role: &str) -> String {
    mint_token(identity_claims(role), TEST_SECRET)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

async fn read_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body should be UTF-8")
}

#[tokio::test]
async fn integration_a_verified_admin_is_relayed_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/apps/overview")
        .match_header(
            "x-request-id",
            Matcher::Regex("^[0-9a-f-]{36}$".to_string()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-upstream-version", "9.9")
        .with_body(r#"{"apps":[]}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(cookie_request(
            "/apps/overview",
            &fresh_token("admin"),
            Method::GET,
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-upstream-version").unwrap(),
        "9.9"
    );
    upstream.assert_async().await;

    let body = read_json(response).await;
    assert_eq!(body, json!({ "apps": [] }));
}

#[tokio::test]
async fn integration_identity_headers_reach_upstream_when_enabled() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/users/42")
        .match_header("x-auth-id", "u-1")
        .match_header("x-auth-name", "Ada")
        .match_header("x-auth-email", "ada@example.com")
        .match_header("x-auth-role", "admin")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut config = build_config(&server.url());
    config.include_identity_headers = Some(true);
    let (app, _config) = build_app(config);

    let response = app
        .oneshot(bearer_request("/users/42", &fresh_token("admin"), Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    upstream.assert_async().await;
}

#[tokio::test]
async fn integration_an_anonymous_protected_request_redirects_to_signin() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("GET", "/").expect(0).create_async().await;

    let (app, config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(bare_request("/", Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some(config.guard.signin_path.as_str()));
    upstream.assert_async().await;
}

#[tokio::test]
async fn integration_a_disallowed_role_redirects_to_the_fallback() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/apps/overview")
        .expect(0)
        .create_async()
        .await;

    let (app, config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(cookie_request(
            "/apps/overview",
            &fresh_token("user"),
            Method::GET,
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some(config.guard.fallback_redirect.as_str()));
    upstream.assert_async().await;
}

#[tokio::test]
async fn integration_a_tampered_token_redirects_to_signin() {
    let (app, config) = build_app(build_config("http://127.0.0.1:1"));
    let tampered = mint_token(identity_claims("admin"), "a-different-secret");

    let response = app
        .oneshot(cookie_request("/", &tampered, Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some(config.guard.signin_path.as_str()));
}

#[tokio::test]
async fn integration_an_expired_token_redirects_to_signin() {
    let (app, config) = build_app(build_config("http://127.0.0.1:1"));
    let expired = mint_token(
        json!({
            "id": "u-1",
            "role": "admin",
            "exp": 1_000_000_000,
        }),
        TEST_SECRET,
    );

    let response = app
        .oneshot(cookie_request("/table/records", &expired, Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some(config.guard.signin_path.as_str()));
}

#[tokio::test]
async fn integration_health_needs_no_credential() {
    let (app, _config) = build_app(build_config("http://127.0.0.1:1"));

    let response = app
        .oneshot(bare_request("/health", Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_text(response).await, "OK");
}

#[tokio::test]
async fn integration_paths_outside_the_guard_relay_anonymously() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/public/landing")
        .with_status(200)
        .with_body("landing")
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(bare_request("/public/landing", Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    upstream.assert_async().await;
    assert_eq!(read_text(response).await, "landing");
}

#[tokio::test]
async fn integration_login_success_installs_the_session_cookie() {
    let mut server = Server::new_async().await;
    // The exact body match proves the remember-me flag stays on this side.
    let upstream = server
        .mock("POST", "/user/login")
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "Valid1!pass",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"user":{"id":"u-1","firstName":"Ada","email":"ada@example.com","role":"admin"},"token":"T"}"#,
        )
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(json_request(
            "/user/login",
            json!({
                "email": "ada@example.com",
                "password": "Valid1!pass",
                "rememberMe": true,
            }),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    upstream.assert_async().await;

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set the session cookie")
        .to_str()
        .expect("cookie header should be UTF-8")
        .to_string();
    assert_eq!(
        cookie,
        "token=T; Path=/; Max-Age=86400; Secure; SameSite=Strict"
    );

    let body = read_json(response).await;
    assert_eq!(body["token"], "T");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn integration_login_mirrors_an_upstream_rejection() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/user/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Invalid email or password"}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(json_request(
            "/user/login",
            json!({ "email": "ada@example.com", "password": "Valid1!pass" }),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::SET_COOKIE), None);

    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "Invalid email or password" }));
}

#[tokio::test]
async fn integration_a_malformed_login_never_reaches_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/user/login")
        .expect(0)
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let response = app
        .oneshot(json_request(
            "/user/login",
            json!({ "email": "not-an-email", "password": "Valid1!pass" }),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    upstream.assert_async().await;

    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "Please enter a valid email" }));
}

#[tokio::test]
async fn integration_an_unreachable_upstream_maps_to_bad_gateway() {
    let (app, _config) = build_app(build_config("http://127.0.0.1:1"));

    let response = app
        .oneshot(json_request(
            "/user/login",
            json!({ "email": "ada@example.com", "password": "Valid1!pass" }),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "An unexpected error occurred" }));
}

#[tokio::test]
async fn integration_logout_expires_the_session_cookie() {
    let (app, _config) = build_app(build_config("http://127.0.0.1:1"));

    let response = app
        .oneshot(bare_request("/user/logout", Method::POST))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should expire the session cookie")
        .to_str()
        .expect("cookie header should be UTF-8")
        .to_string();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));

    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "Logged out" }));
}

#[tokio::test]
async fn integration_session_introspection_returns_the_identity() {
    let (app, _config) = build_app(build_config("http://127.0.0.1:1"));

    let response = app
        .oneshot(bearer_request("/session", &fresh_token("admin"), Method::GET))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(
        body,
        json!({
            "id": "u-1",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
        })
    );
}

#[tokio::test]
async fn integration_session_introspection_rejects_anonymous_callers() {
    let (app, _config) = build_app(build_config("http://127.0.0.1:1"));

    let response = app
        .oneshot(bare_request("/session", Method::GET))
        .await
        .expect("request should complete");

    // An API surface: a plain 401, never a redirect.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::LOCATION), None);

    let body = read_json(response).await;
    assert_eq!(body, json!({ "error": "no token presented" }));
}

#[tokio::test]
async fn integration_the_relay_preserves_method_query_and_body() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/table/update?dry_run=1")
        .match_body(Matcher::Json(json!({ "rows": [1, 2, 3] })))
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"maintenance"}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));
    let request = with_connect_info(
        Request::builder()
            .method(Method::POST)
            .uri("/table/update?dry_run=1")
            .header("Cookie", format!("token={}", fresh_token("seller")))
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"rows":[1,2,3]}"#))
            .expect("failed to build request"),
    );

    let response = app.oneshot(request).await.expect("request should complete");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    upstream.assert_async().await;

    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "maintenance" }));
}

#[tokio::test]
async fn integration_metrics_expose_guard_and_relay_counters() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/apps/overview")
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let (app, _config) = build_app(build_config(&server.url()));

    // One anonymous redirect, then the same token twice: a miss, then a hit.
    app.clone()
        .oneshot(bare_request("/", Method::GET))
        .await
        .expect("request should complete");
    let token = fresh_token("admin");
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(cookie_request("/apps/overview", &token, Method::GET))
            .await
            .expect("request should complete");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(bare_request("/metrics", Method::GET))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );

    let text = read_text(response).await;
    assert!(text.contains("guard_decisions_total"));
    assert!(text.contains(r#"decision="redirect_sign_in""#));
    assert!(text.contains(r#"decision="proceed""#));
    assert!(text.contains(r#"result="no_token""#));
    assert!(text.contains(r#"cache="miss""#));
    assert!(text.contains(r#"cache="hit""#));
    assert!(text.contains("verification_duration_seconds"));
    assert!(text.contains("relay_requests_total"));
    assert!(text.contains(r#"outcome="2xx""#));
}
