//! Interaction engine through the API surface: favorites, ratings,
//! comments, achievements and role gating.

mod common;

use common::*;
use http::StatusCode;

use bikedream_core::model::Role;

#[tokio::test]
async fn rating_aggregate_reflects_both_raters() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("X", 2024, 9000.0)]).await;
    let ana = register_as(&state, "ana@example.com", Role::User).await;
    let bo = register_as(&state, "bo@example.com", Role::User).await;

    let (status, _) = post("/api/motorcycles/X/rate")
        .as_user(&ana)
        .json(serde_json::json!({ "rating": 4 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post("/api/motorcycles/X/rate")
        .as_user(&bo)
        .json(serde_json::json!({ "rating": 2, "review_text": "stiff suspension" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get("/api/motorcycles/X").send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 3.0);
    assert_eq!(body["total_ratings"], 2);

    let (status, body) = get("/api/motorcycles/X/ratings").send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ratings"].as_array().unwrap().len(), 2);
    assert!(body["ratings"][0]["user_name"].is_string());
}

#[tokio::test]
async fn rating_boundaries() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("X", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    let (status, body) = post("/api/motorcycles/X/rate")
        .as_user(&user)
        .json(serde_json::json!({ "rating": 6 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "rating");

    let (status, _) = post("/api/motorcycles/X/rate")
        .as_user(&user)
        .json(serde_json::json!({ "rating": 0 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown fields in the payload are rejected, not stored.
    let (status, _) = post("/api/motorcycles/X/rate")
        .as_user(&user)
        .json(serde_json::json!({ "rating": 4, "stars": 5 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post("/api/motorcycles/X/rate")
        .json(serde_json::json!({ "rating": 4 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rerating_keeps_one_row() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("X", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    for stars in [5, 3] {
        let (status, _) = post("/api/motorcycles/X/rate")
            .as_user(&user)
            .json(serde_json::json!({ "rating": stars }))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get("/api/motorcycles/X").send(&state).await;
    assert_eq!(body["total_ratings"], 1);
    assert_eq!(body["average_rating"], 3.0);
}

#[tokio::test]
async fn comment_reply_depth_is_limited() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    let (status, c1) = post("/api/motorcycles/M/comment")
        .as_user(&user)
        .json(serde_json::json!({ "content": "Top-level" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, c2) = post("/api/motorcycles/M/comment")
        .as_user(&user)
        .json(serde_json::json!({ "content": "Reply", "parent_comment_id": c1["id"] }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post("/api/motorcycles/M/comment")
        .as_user(&user)
        .json(serde_json::json!({ "content": "Too deep", "parent_comment_id": c2["id"] }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn comment_content_bounds() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    let (status, _) = post("/api/motorcycles/M/comment")
        .as_user(&user)
        .json(serde_json::json!({ "content": "" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post("/api/motorcycles/M/comment")
        .as_user(&user)
        .json(serde_json::json!({ "content": "x".repeat(1001) }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn favorite_round_trip_and_not_found() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    let (status, _) = post("/api/motorcycles/M/favorite").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    // Second favorite is a no-op, not an error.
    let (status, _) = post("/api/motorcycles/M/favorite").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get("/api/motorcycles/favorites").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["motorcycles"].as_array().unwrap().len(), 1);

    let (status, _) = delete("/api/motorcycles/M/favorite").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get("/api/motorcycles/favorites").as_user(&user).send(&state).await;
    assert_eq!(body["motorcycles"].as_array().unwrap().len(), 0);

    let (status, _) =
        post("/api/motorcycles/ghost/favorite").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn like_toggle_round_trip() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let author = register_as(&state, "author@example.com", Role::User).await;
    let liker = register_as(&state, "liker@example.com", Role::User).await;

    let (_, comment) = post("/api/motorcycles/M/comment")
        .as_user(&author)
        .json(serde_json::json!({ "content": "Likeable" }))
        .send(&state)
        .await;
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (status, body) =
        post(&format!("/api/comments/{comment_id}/like")).as_user(&liker).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], true);

    let (_, body) =
        post(&format!("/api/comments/{comment_id}/like")).as_user(&liker).send(&state).await;
    assert_eq!(body["liked"], false);

    let (_, body) = get("/api/motorcycles/M/comments").as_user(&liker).send(&state).await;
    assert_eq!(body["comments"][0]["like_count"], 0);
}

#[tokio::test]
async fn delete_comment_tombstones_and_keeps_replies() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let author = register_as(&state, "author@example.com", Role::User).await;
    let other = register_as(&state, "other@example.com", Role::User).await;
    let moderator = register_as(&state, "mod@example.com", Role::Moderator).await;

    let (_, c1) = post("/api/motorcycles/M/comment")
        .as_user(&author)
        .json(serde_json::json!({ "content": "Parent" }))
        .send(&state)
        .await;
    let parent_id = c1["id"].as_str().unwrap().to_string();
    post("/api/motorcycles/M/comment")
        .as_user(&other)
        .json(serde_json::json!({ "content": "Child", "parent_comment_id": parent_id }))
        .send(&state)
        .await;

    // A non-author, non-moderator cannot delete.
    let (status, _) =
        delete(&format!("/api/comments/{parent_id}")).as_user(&other).send(&state).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        delete(&format!("/api/comments/{parent_id}")).as_user(&moderator).send(&state).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get("/api/motorcycles/M/comments").send(&state).await;
    let thread = &body["comments"][0];
    assert_eq!(thread["deleted"], true);
    assert!(thread["content"].is_null());
    assert_eq!(thread["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn achievements_are_earned_once() {
    let state = test_state().await;
    seed_bikes(&state, vec![bike("M", 2024, 9000.0)]).await;
    let user = register_as(&state, "rider@example.com", Role::User).await;

    post("/api/motorcycles/M/favorite").as_user(&user).send(&state).await;

    let (status, body) = get("/api/achievements/me").as_user(&user).send(&state).await;
    assert_eq!(status, StatusCode::OK);
    let earned: Vec<&serde_json::Value> = body["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| !a["earned_at"].is_null())
        .collect();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0]["id"], "ach-first-favorite");

    // The public catalog needs no auth.
    let (status, body) = get("/api/achievements").send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["achievements"].as_array().unwrap().len() >= 10);
}

#[tokio::test]
async fn admin_surface_role_gating() {
    let state = test_state().await;
    let moderator = register_as(&state, "mod@example.com", Role::Moderator).await;
    let admin = register_as(&state, "admin@example.com", Role::Admin).await;

    // Stats and user listing are Admin-only; a moderator gets 403.
    let (status, _) = get("/api/admin/stats").as_user(&moderator).send(&state).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = get("/api/admin/stats").as_user(&admin).send(&state).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get("/api/admin/users").as_user(&moderator).send(&state).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Role mutation is Admin-only and takes the new role as a query param.
    let target = register_as(&state, "target@example.com", Role::User).await;
    let target_id = target.user.as_ref().unwrap().id.clone();
    let (status, body) = put(&format!("/api/admin/users/{target_id}/role"))
        .query("new_role", "moderator")
        .as_user(&admin)
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Moderator");

    let (status, _) = put(&format!("/api/admin/users/{target_id}/role"))
        .query("new_role", "superuser")
        .as_user(&admin)
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_count_from_same_source_as_listing() {
    let state = test_state().await;
    seed_bikes(&state, (0..7).map(|i| bike(&format!("m-{i}"), 2024, 1000.0)).collect()).await;
    let admin = register_as(&state, "admin@example.com", Role::Admin).await;

    let (_, listing) = get("/api/motorcycles").send(&state).await;
    let (_, stats) = get("/api/admin/stats").as_user(&admin).send(&state).await;
    assert_eq!(
        stats["motorcycles"].as_u64().unwrap(),
        listing["pagination"]["total_count"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn banner_lifecycle() {
    let state = test_state().await;
    let moderator = register_as(&state, "mod@example.com", Role::Moderator).await;

    let (status, banner) = post("/api/admin/banners")
        .as_user(&moderator)
        .json(serde_json::json!({ "message": "Track day", "priority": 80 }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Public live listing needs no auth.
    let (status, body) = get("/api/banners").send(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banners"].as_array().unwrap().len(), 1);

    let banner_id = banner["id"].as_str().unwrap().to_string();
    let (status, _) = delete(&format!("/api/admin/banners/{banner_id}"))
        .as_user(&moderator)
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Anonymous admin access fails closed.
    let (status, _) = post("/api/admin/banners")
        .json(serde_json::json!({ "message": "Nope" }))
        .send(&state)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
