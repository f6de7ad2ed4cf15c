//! Tests for the file server, hit metrics, reset and health check.

mod common;

use axum::http::StatusCode;
use chirpy::cli::Platform;
use common::{
    create_authenticated_user, create_test_app, create_test_app_with, request, send, send_text,
    test_config,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_healthz() {
    let t = create_test_app().await;

    let response = tower::ServiceExt::oneshot(
        t.app.clone(),
        request("GET", "/api/healthz", None, None),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let (_, text) = send_text(&t.app, request("GET", "/api/healthz", None, None)).await;
    assert_eq!(text, "OK");
}

#[tokio::test]
async fn test_app_serves_files_and_counts_hits() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();
    std::fs::write(dir.path().join("logo.txt"), "chirp").unwrap();

    let t = create_test_app_with(Platform::Dev, dir.path().to_path_buf()).await;

    let (status, text) = send_text(&t.app, request("GET", "/app/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Welcome to Chirpy"));

    let (status, text) = send_text(&t.app, request("GET", "/app/logo.txt", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "chirp");

    assert_eq!(t.hits.get(), 2);

    // API and admin requests are not counted
    send_text(&t.app, request("GET", "/api/healthz", None, None)).await;
    let (status, html) = send_text(&t.app, request("GET", "/admin/metrics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Chirpy has been visited 2 times!"));
    assert_eq!(t.hits.get(), 2);
}

#[tokio::test]
async fn test_reset_forbidden_outside_dev() {
    let t = create_test_app_with(Platform::Production, ".".into()).await;
    create_authenticated_user(&t.app, "a@b.com", "secret123").await;
    t.hits.increment();

    let (status, _) = send(&t.app, request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing was touched
    assert_eq!(t.hits.get(), 1);
    assert!(t.db.users().get_by_email("a@b.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_reset_in_dev_clears_everything() {
    let t = create_test_app().await;
    let (user_id, access, refresh) =
        create_authenticated_user(&t.app, "a@b.com", "secret123").await;
    common::create_chirp(&t.app, &access, "gone soon").await;
    t.hits.increment();

    let (status, _) = send(&t.app, request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(t.hits.get(), 0);
    assert!(t.db.users().get_by_id(&user_id).await.unwrap().is_none());
    assert!(t.db.refresh_tokens().get(&refresh).await.unwrap().is_none());

    let (_, list) = send(&t.app, request("GET", "/api/chirps", None, None)).await;
    assert_eq!(list, json!([]));

    let (status, _) = send(
        &t.app,
        request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "a@b.com", "password": "secret123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_run_server_serves_over_tcp() {
    let config = test_config(Platform::Production, ".".into()).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(chirpy::run_server(config, listener));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{}", response);
    assert!(response.ends_with("OK"));

    server.abort();
}
