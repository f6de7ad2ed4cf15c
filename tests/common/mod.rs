#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chirpy::{
    ServerConfig, cli::Platform, create_app, db::Database, jwt::JwtConfig, metrics::HitCounter,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-for-integration-tests";
pub const TEST_POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
    pub hits: Arc<HitCounter>,
}

/// Create a test app on the dev platform, serving the current directory under `/app`.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(Platform::Dev, PathBuf::from(".")).await
}

pub async fn create_test_app_with(platform: Platform, assets_dir: PathBuf) -> TestApp {
    let config = test_config(platform, assets_dir).await;
    TestApp {
        app: create_app(&config),
        db: config.db.clone(),
        jwt: JwtConfig::new(TEST_JWT_SECRET),
        hits: config.hits.clone(),
    }
}

/// Server config backed by a fresh in-memory database.
pub async fn test_config(platform: Platform, assets_dir: PathBuf) -> ServerConfig {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    ServerConfig {
        db,
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        polka_key: Arc::from(TEST_POLKA_KEY),
        platform,
        assets_dir,
        hits: Arc::new(HitCounter::new()),
    }
}

/// Build a request with an optional JSON body and `Authorization` header value.
pub fn request(
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Send a request and return the status and the body as JSON (`Null` when empty or not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, text) = send_text(app, request).await;
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, json)
}

/// Send a request and return the status and the raw body text.
pub async fn send_text(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Create a user through the API and return the response body.
pub async fn create_user(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/users",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);
    body
}

/// Log in through the API and return the response body.
pub async fn login(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body
}

/// Create a user, log in, and return (user_id, access_token, refresh_token).
pub async fn create_authenticated_user(
    app: &Router,
    email: &str,
    password: &str,
) -> (String, String, String) {
    create_user(app, email, password).await;
    let session = login(app, email, password).await;
    (
        session["id"].as_str().unwrap().to_string(),
        session["token"].as_str().unwrap().to_string(),
        session["refresh_token"].as_str().unwrap().to_string(),
    )
}

/// Post a chirp as the given user and return the response body.
pub async fn create_chirp(app: &Router, access_token: &str, body: &str) -> Value {
    let (status, chirp) = send(
        app,
        request(
            "POST",
            "/api/chirps",
            Some(&bearer(access_token)),
            Some(serde_json::json!({ "body": body })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create chirp failed: {}", chirp);
    chirp
}
