//! Post and comment API integration tests

use axum::http::{Method, StatusCode};
use board_api::repository::CommentRepository;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::create_test_app;

#[tokio::test]
async fn test_health_endpoints() {
    let app = create_test_app();

    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert!(body["message"].is_string());

    let (status, body) = app.send(Method::GET, "/api/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_response_carries_trace_headers() {
    let app = create_test_app();

    let request = axum::http::Request::builder()
        .uri("/api/health")
        .header("x-trace-id", "trace-abc")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_create_post_requires_login() {
    let app = create_test_app();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/posts",
            None,
            Some(json!({ "title": "Hello", "content": "World" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_anonymous_mutation_with_bad_input_is_unauthenticated() {
    let app = create_test_app();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/posts",
            None,
            Some(json!({ "title": "", "content": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Login required");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/posts/{}", Uuid::new_v4()),
            None,
            Some(json!({ "nope": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::DELETE, "/api/posts/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/posts/{}/comments", Uuid::new_v4()),
            None,
            Some(json!({ "content": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_path_id_has_error_body() {
    let app = create_test_app();
    let (_, token) = app.register("a@x.com", "alice").await;

    let (status, body) = app
        .send(Method::DELETE, "/api/posts/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Invalid path parameter");

    let (status, body) = app
        .send(Method::GET, "/api/posts/not-a-uuid/comments", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid path parameter");
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = create_test_app();
    let (author_id, token) = app.register("a@x.com", "alice").await;

    let post_id = app.create_post(&token, "Hello", "World").await;

    // reads are open to anonymous callers and count views
    let (status, body) = app
        .send(Method::GET, &format!("/api/posts/{}", post_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["authorId"], author_id.to_string());
    assert_eq!(body["viewCount"], 1);

    let (_, body) = app
        .send(Method::GET, &format!("/api/posts/{}", post_id), None, None)
        .await;
    assert_eq!(body["viewCount"], 2);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/posts/{}", post_id),
            Some(&token),
            Some(json!({ "title": "Hello again", "content": "Edited" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello again");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/posts/{}", post_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::GET, &format!("/api/posts/{}", post_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_posts_newest_first() {
    let app = create_test_app();
    let (_, token) = app.register("a@x.com", "alice").await;

    let first = app.create_post(&token, "first", "body").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = app.create_post(&token, "second", "body").await;

    let (status, body) = app.send(Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.to_string(), first.to_string()]);
}

#[tokio::test]
async fn test_non_author_cannot_edit_or_delete_post() {
    let app = create_test_app();
    let (_, alice) = app.register("a@x.com", "alice").await;
    let (_, bob) = app.register("b@x.com", "bob").await;

    let post_id = app.create_post(&alice, "Hello", "World").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/posts/{}", post_id),
            Some(&bob),
            Some(json!({ "title": "Hijacked", "content": "!" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/posts/{}", post_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // untouched
    let (_, body) = app
        .send(Method::GET, &format!("/api/posts/{}", post_id), None, None)
        .await;
    assert_eq!(body["title"], "Hello");
}

#[tokio::test]
async fn test_edit_missing_post() {
    let app = create_test_app();
    let (_, token) = app.register("a@x.com", "alice").await;
    let uri = format!("/api/posts/{}", Uuid::new_v4());
    let edit = json!({ "title": "t", "content": "c" });

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&token), Some(edit.clone()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // without a principal the missing post is never looked at
    let (status, _) = app.send(Method::PUT, &uri, None, Some(edit)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_post_fields_rejected() {
    let app = create_test_app();
    let (_, token) = app.register("a@x.com", "alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "  ", "content": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("content"));
    assert!(message.contains("title"));
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = create_test_app();
    let (alice_id, alice) = app.register("a@x.com", "alice").await;
    let (_, bob) = app.register("b@x.com", "bob").await;
    let post_id = app.create_post(&alice, "Hello", "World").await;
    let comments_uri = format!("/api/posts/{}/comments", post_id);

    let (status, body) = app
        .send(
            Method::POST,
            &comments_uri,
            Some(&alice),
            Some(json!({ "content": "first!" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id: Uuid = body.as_str().unwrap().parse().unwrap();
    let comment_uri = format!("{}/{}", comments_uri, comment_id);

    let (status, body) = app.send(Method::GET, &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["content"], "first!");
    assert_eq!(body[0]["authorId"], alice_id.to_string());

    let (status, _) = app
        .send(
            Method::PUT,
            &comment_uri,
            Some(&bob),
            Some(json!({ "content": "mine now" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PUT,
            &comment_uri,
            Some(&alice),
            Some(json!({ "content": "edited" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");

    let (status, _) = app
        .send(Method::DELETE, &comment_uri, Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::DELETE, &comment_uri, Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.send(Method::GET, &comments_uri, None, None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_under_wrong_post_is_not_found() {
    let app = create_test_app();
    let (_, alice) = app.register("a@x.com", "alice").await;
    let post_a = app.create_post(&alice, "A", "a").await;
    let post_b = app.create_post(&alice, "B", "b").await;

    let (_, body) = app
        .send(
            Method::POST,
            &format!("/api/posts/{}/comments", post_a),
            Some(&alice),
            Some(json!({ "content": "on A" })),
        )
        .await;
    let comment_id = body.as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/posts/{}/comments/{}", post_b, comment_id),
            Some(&alice),
            Some(json!({ "content": "moved" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_on_missing_post() {
    let app = create_test_app();
    let (_, alice) = app.register("a@x.com", "alice").await;
    let uri = format!("/api/posts/{}/comments", Uuid::new_v4());

    let (status, _) = app
        .send(Method::POST, &uri, Some(&alice), Some(json!({ "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_post_removes_its_comments() {
    let app = create_test_app();
    let (_, alice) = app.register("a@x.com", "alice").await;
    let post_id = app.create_post(&alice, "Hello", "World").await;

    let (_, body) = app
        .send(
            Method::POST,
            &format!("/api/posts/{}/comments", post_id),
            Some(&alice),
            Some(json!({ "content": "bye" })),
        )
        .await;
    let comment_id: Uuid = body.as_str().unwrap().parse().unwrap();

    app.send(
        Method::DELETE,
        &format!("/api/posts/{}", post_id),
        Some(&alice),
        None,
    )
    .await;

    let comment = app
        .state
        .repos
        .comments
        .find_by_id(comment_id)
        .await
        .unwrap();
    assert!(comment.is_none());
}
