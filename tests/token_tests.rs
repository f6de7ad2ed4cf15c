//! Tests for refresh token exchange and revocation.
//!
//! Tests cover:
//! - Refresh flow issuing a new access token for the same user
//! - Revocation making a refresh token permanently unusable
//! - Expired, unknown and malformed refresh tokens
//! - Access and refresh tokens not being interchangeable

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{bearer, create_authenticated_user, create_test_app, request, send};
use serde_json::json;

#[tokio::test]
async fn test_refresh_issues_access_token_for_same_user() {
    let t = create_test_app().await;
    let (user_id, _, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    let (status, body) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&refresh)), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    let claims = t.jwt.validate_access_token(token).unwrap();
    assert_eq!(claims.sub, user_id);

    // Not rotated: the same refresh token keeps working
    let (status, _) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&refresh)), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refreshed_access_token_authorizes_requests() {
    let t = create_test_app().await;
    let (_, _, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    let (_, body) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&refresh)), None),
    )
    .await;
    let token = body["token"].as_str().unwrap();

    let (status, _) = send(
        &t.app,
        request(
            "POST",
            "/api/chirps",
            Some(&bearer(token)),
            Some(json!({ "body": "fresh token" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_revoked_refresh_token_is_rejected() {
    let t = create_test_app().await;
    let (_, _, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    let (status, _) = send(
        &t.app,
        request("POST", "/api/revoke", Some(&bearer(&refresh)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&refresh)), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());

    // The record is kept for audit
    let stored = t.db.refresh_tokens().get(&refresh).await.unwrap().unwrap();
    assert!(stored.revoked_at.is_some());
}

#[tokio::test]
async fn test_revoke_keeps_first_revocation_time() {
    let t = create_test_app().await;
    let (_, _, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    send(
        &t.app,
        request("POST", "/api/revoke", Some(&bearer(&refresh)), None),
    )
    .await;
    let first = t
        .db
        .refresh_tokens()
        .get(&refresh)
        .await
        .unwrap()
        .unwrap()
        .revoked_at;

    let (status, _) = send(
        &t.app,
        request("POST", "/api/revoke", Some(&bearer(&refresh)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let second = t
        .db
        .refresh_tokens()
        .get(&refresh)
        .await
        .unwrap()
        .unwrap()
        .revoked_at;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_revoke_only_affects_one_session() {
    let t = create_test_app().await;
    let (_, _, first) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;
    let second = common::login(&t.app, "a@b.com", "secret123").await;
    let second = second["refresh_token"].as_str().unwrap();

    send(
        &t.app,
        request("POST", "/api/revoke", Some(&bearer(&first)), None),
    )
    .await;

    let (status, _) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(second)), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected() {
    let t = create_test_app().await;
    let (user_id, _, _) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    let expired = "ab".repeat(32);
    t.db.refresh_tokens()
        .create(&expired, &user_id, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let (status, _) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&expired)), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_refresh_token_is_rejected() {
    let t = create_test_app().await;

    let unknown = "cd".repeat(32);
    for uri in ["/api/refresh", "/api/revoke"] {
        let (status, _) = send(&t.app, request("POST", uri, Some(&bearer(&unknown)), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_missing_or_malformed_header_is_rejected() {
    let t = create_test_app().await;
    let (_, _, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    let bad_headers = [
        None,
        Some(refresh.clone()),
        Some(format!("bearer {}", refresh)),
        Some(format!("ApiKey {}", refresh)),
        Some("Bearer ".to_string()),
    ];

    for header in bad_headers {
        for uri in ["/api/refresh", "/api/revoke"] {
            let (status, _) = send(&t.app, request("POST", uri, header.as_deref(), None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} with {:?}", uri, header);
        }
    }

    // None of the attempts above revoked the token
    let stored = t.db.refresh_tokens().get(&refresh).await.unwrap().unwrap();
    assert!(stored.revoked_at.is_none());
}

#[tokio::test]
async fn test_tokens_are_not_interchangeable() {
    let t = create_test_app().await;
    let (_, access, refresh) = create_authenticated_user(&t.app, "a@b.com", "secret123").await;

    // Access token cannot be used to refresh
    let (status, _) = send(
        &t.app,
        request("POST", "/api/refresh", Some(&bearer(&access)), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh token cannot be used as an access token
    let (status, _) = send(
        &t.app,
        request(
            "POST",
            "/api/chirps",
            Some(&bearer(&refresh)),
            Some(json!({ "body": "hello" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
