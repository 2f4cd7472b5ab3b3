//! Identity flows through the API surface.

mod common;

use common::*;
use http::StatusCode;

use bikedream_core::auth::Credential;
use bikedream_core::model::Role;

#[tokio::test]
async fn register_login_me_round_trip() {
    let state = test_state().await;

    let (status, body) = post("/api/auth/register")
        .json(serde_json::json!({
            "email": "rider@example.com",
            "password": "password123",
            "name": "Rider",
        }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "rider@example.com");
    assert_eq!(body["user"]["role"], "User");
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert!(body["user"]["password_hash"].is_null());

    // The issued credentials resolve back to the account.
    let token = body["token"].as_str().unwrap();
    let user = state.auth.authenticate(Credential::Bearer(token)).await.unwrap();
    assert_eq!(user.email, "rider@example.com");

    let (status, body) = post("/api/auth/login")
        .json(serde_json::json!({ "email": "RIDER@example.com", "password": "password123" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "rider@example.com");

    let (status, _) = post("/api/auth/login")
        .json(serde_json::json!({ "email": "rider@example.com", "password": "wrong-pass" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let state = test_state().await;
    let payload = serde_json::json!({
        "email": "rider@example.com",
        "password": "password123",
        "name": "Rider",
    });

    let (status, _) = post("/api/auth/register").json(payload.clone()).send(&state).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post("/api/auth/register").json(payload).send(&state).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn me_and_logout() {
    let state = test_state().await;
    let ctx = register_as(&state, "rider@example.com", Role::User).await;

    let (status, body) = get("/api/auth/me").as_user(&ctx).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "rider@example.com");

    let (status, _) = get("/api/auth/me").send(&state).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post("/api/auth/logout").as_user(&ctx).send(&state).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The session no longer authenticates.
    let session_id = ctx.session_id.as_deref().unwrap();
    assert!(state.auth.authenticate(Credential::SessionId(session_id)).await.is_err());
}

#[tokio::test]
async fn external_profile_creates_then_reuses() {
    let state = test_state().await;
    let claim = serde_json::json!({
        "email": "ext@example.com",
        "name": "Ext Rider",
        "picture": "https://img.example/p.jpg",
        "session_token": "opaque-upstream-token",
    });

    let (status, first) = post("/api/auth/profile").json(claim.clone()).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = post("/api/auth/profile").json(claim).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    // External-identity accounts cannot log in with a password.
    let (status, _) = post("/api/auth/login")
        .json(serde_json::json!({ "email": "ext@example.com", "password": "password123" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let state = test_state().await;

    // Missing body.
    let (status, _) = post("/api/auth/register").send(&state).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown field.
    let (status, _) = post("/api/auth/register")
        .json(serde_json::json!({
            "email": "rider@example.com",
            "password": "password123",
            "name": "Rider",
            "role": "Admin",
        }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Short password is a field-level validation failure.
    let (status, body) = post("/api/auth/register")
        .json(serde_json::json!({
            "email": "rider@example.com",
            "password": "short",
            "name": "Rider",
        }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "password");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let state = test_state().await;
    let (status, _) = get("/api/spaceships").send(&state).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
