//! HTTP integration tests for the friend graph.
//!
//! Each test creates its own users and cleans up via `CleanupGuard` (CASCADE).
//!
//! Run with: `cargo test --test friends_http_test -- --ignored`

mod helpers;

use axum::body::Body;
use axum::http::Method;
use helpers::{body_to_json, count_notifications, create_friendship, create_test_user, json_body, TestApp};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn pending_requests(pool: &PgPool, a: Uuid, b: Uuid) -> i64 {
    sqlx::query_scalar(
        r"SELECT COUNT(*) FROM friend_requests
           WHERE (from_user_id = $1 AND to_user_id = $2)
              OR (from_user_id = $2 AND to_user_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn friendships(pool: &PgPool, a: Uuid, b: Uuid) -> i64 {
    sqlx::query_scalar(
        r"SELECT COUNT(*) FROM friendships
           WHERE (first_user_id = $1 AND second_user_id = $2)
              OR (first_user_id = $2 AND second_user_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn send_request(app: &TestApp, from: Uuid, to: Uuid) -> axum::http::Response<Body> {
    let req = app
        .authed(Method::POST, "/api/friends/requests", from)
        .header("content-type", "application/json")
        .body(json_body(&json!({ "to": to })))
        .unwrap();
    app.oneshot(req).await
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_send_and_accept_request() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);

    let resp = send_request(&app, u1, u2).await;
    assert_eq!(resp.status(), 200);
    let request = body_to_json(resp).await;
    assert_eq!(request["from"], u1.to_string());
    assert_eq!(request["to"], u2.to_string());
    assert_eq!(count_notifications(&app.pool, u2, "friend_request").await, 1);

    // Received list shows the sender
    let req = app
        .authed(Method::GET, "/api/friends/requests/received", u2)
        .body(Body::empty())
        .unwrap();
    let received = body_to_json(app.oneshot(req).await).await;
    assert_eq!(received[0]["user"]["id"], u1.to_string());

    let request_id = request["id"].as_str().unwrap();
    let req = app
        .authed(Method::PUT, &format!("/api/friends/requests/{request_id}/accept"), u2)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), 200);

    let friendship = body_to_json(resp).await;
    assert_eq!(friendship["users"], json!([u1, u2]));
    assert_eq!(friendships(&app.pool, u1, u2).await, 1);
    assert_eq!(pending_requests(&app.pool, u1, u2).await, 0);
    assert_eq!(
        count_notifications(&app.pool, u1, "friend_request_accepted").await,
        1
    );

    // Friends list of either side shows the other
    let req = app
        .authed(Method::GET, &format!("/api/friends/{u2}"), u1)
        .body(Body::empty())
        .unwrap();
    let friends = body_to_json(app.oneshot(req).await).await;
    assert_eq!(friends.as_array().unwrap().len(), 1);
    assert_eq!(friends[0]["id"], u1.to_string());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_self_request_rejected() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);

    let resp = send_request(&app, u1, u1).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(body_to_json(resp).await["message"], "The 2 ids are the same");
    assert_eq!(pending_requests(&app.pool, u1, u1).await, 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_duplicate_request_either_direction() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);

    assert_eq!(send_request(&app, u1, u2).await.status(), 200);

    for (from, to) in [(u1, u2), (u2, u1)] {
        let resp = send_request(&app, from, to).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(body_to_json(resp).await["message"], "Request already sent");
    }
    assert_eq!(pending_requests(&app.pool, u1, u2).await, 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_request_to_existing_friend_rejected() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);
    create_friendship(&app.pool, u2, u1).await;

    let resp = send_request(&app, u1, u2).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(
        body_to_json(resp).await["message"],
        "This user is already in your friend list"
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_request_to_unknown_user() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);

    let resp = send_request(&app, u1, Uuid::now_v7()).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_only_recipient_may_accept() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let (u3, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);
    guard.delete_user(u3);

    let request = body_to_json(send_request(&app, u1, u2).await).await;
    let request_id = request["id"].as_str().unwrap();

    for caller in [u1, u3] {
        let req = app
            .authed(Method::PUT, &format!("/api/friends/requests/{request_id}/accept"), caller)
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(req).await.status(), 401);
    }

    assert_eq!(friendships(&app.pool, u1, u2).await, 0);
    assert_eq!(pending_requests(&app.pool, u1, u2).await, 1);
    assert_eq!(
        count_notifications(&app.pool, u1, "friend_request_accepted").await,
        0
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_delete_request_by_either_party() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let (u3, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);
    guard.delete_user(u3);

    let request = body_to_json(send_request(&app, u1, u2).await).await;
    let request_id = request["id"].as_str().unwrap();

    // Outsider cannot delete
    let req = app
        .authed(Method::DELETE, &format!("/api/friends/requests/{request_id}"), u3)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.status(), 401);

    // Recipient rejects
    let req = app
        .authed(Method::DELETE, &format!("/api/friends/requests/{request_id}"), u2)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await["message"], "Request deleted successfully");

    // Gone now
    let req = app
        .authed(Method::DELETE, &format!("/api/friends/requests/{request_id}"), u1)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.status(), 404);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_remove_friend() {
    let app = TestApp::new().await;
    let (u1, _) = create_test_user(&app.pool).await;
    let (u2, _) = create_test_user(&app.pool).await;
    let mut guard = app.cleanup_guard();
    guard.delete_user(u1);
    guard.delete_user(u2);
    create_friendship(&app.pool, u1, u2).await;

    // Either order matches
    let req = app
        .authed(Method::DELETE, &format!("/api/friends/{u1}"), u2)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await["message"], "Friend deleted successfully");
    assert_eq!(friendships(&app.pool, u1, u2).await, 0);

    let req = app
        .authed(Method::DELETE, &format!("/api/friends/{u1}"), u2)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.status(), 404);
}
