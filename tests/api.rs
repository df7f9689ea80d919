//! HTTP surface tests: routing, status mapping and response shapes,
//! exercised against the in-memory store with `oneshot` requests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt;
use uuid::Uuid;

use athenaeum_server::{
    api,
    models::book::Book,
    repository::Repository,
    services::Services,
    store::MemoryStore,
    AppState,
};

/// Router plus a handle on the services behind it, for seeding state.
fn app() -> (Router, Arc<Services>) {
    let repository = Repository::new(Arc::new(MemoryStore::new()));
    let services = Arc::new(Services::new(repository));
    let router = api::router(AppState {
        services: services.clone(),
    });
    (router, services)
}

fn book(isbn: &str, copies: i32) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: "The Dispossessed".to_string(),
        author: "Ursula K. Le Guin".to_string(),
        category: "Fiction".to_string(),
        publisher: "Harper & Row".to_string(),
        publication_year: 1974,
        total_copies: copies,
        available_copies: copies,
        description: String::new(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Json) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post_form(router: &Router, path: &str, body: String) -> (StatusCode, Json) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from(body))
        .unwrap();
    send(router, request).await
}

async fn get(router: &Router, path: &str) -> (StatusCode, Json) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn register_user(router: &Router) -> Uuid {
    let (status, body) = post_form(
        router,
        "/users",
        "email=alice@example.org&first_name=Alice&last_name=Martin".to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["user_id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let (router, _) = app();
    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn register_returns_generated_user_id() {
    let (router, _) = app();
    let user_id = register_user(&router).await;
    assert!(!user_id.is_nil());
}

#[tokio::test]
async fn get_unknown_book_is_404() {
    let (router, _) = app();
    let (status, body) = get(&router, "/books/no-such-isbn").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn borrow_flow_over_http() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();
    let user_id = register_user(&router).await;

    // Unknown book is a 404, not a denial.
    let (status, _) = post_form(
        &router,
        "/borrows",
        format!("user_id={user_id}&isbn=no-such-isbn"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // First borrow succeeds.
    let (status, body) =
        post_form(&router, "/borrows", format!("user_id={user_id}&isbn=isbn-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Stock is visible through the catalog endpoint.
    let (status, body) = get(&router, "/books/isbn-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_copies"], 0);

    // Second borrow of the same book by the same patron is denied.
    let (status, body) =
        post_form(&router, "/borrows", format!("user_id={user_id}&isbn=isbn-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "denied");

    // Return succeeds and restores the stock.
    let (status, body) = post_form(
        &router,
        "/borrows/return",
        format!("user_id={user_id}&isbn=isbn-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let (_, body) = get(&router, "/books/isbn-1").await;
    assert_eq!(body["available_copies"], 1);

    // Returning again is denied: there is no active loan left.
    let (status, _) = post_form(
        &router,
        "/borrows/return",
        format!("user_id={user_id}&isbn=isbn-1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn borrow_by_unknown_patron_is_404() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();

    let (status, _) = post_form(
        &router,
        "/borrows",
        format!("user_id={}&isbn=isbn-1", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_user_id_is_400() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();

    let (status, body) =
        post_form(&router, "/borrows", "user_id=not-a-uuid&isbn=isbn-1".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = get(&router, "/users/not-a-uuid/borrows").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn loan_histories_are_exposed_per_patron_and_per_book() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 2)).await.unwrap();
    let user_id = register_user(&router).await;

    post_form(&router, "/borrows", format!("user_id={user_id}&isbn=isbn-1")).await;
    post_form(
        &router,
        "/borrows/return",
        format!("user_id={user_id}&isbn=isbn-1"),
    )
    .await;

    // Patron history keeps both events; book history keeps the one loan.
    let (status, body) = get(&router, &format!("/users/{user_id}/borrows")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get(&router, "/books/isbn-1/borrows").await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "RETURNED");
}

#[tokio::test]
async fn category_and_author_listings() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();

    let (status, body) = get(&router, "/books?category=Fiction").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["isbn"], "isbn-1");

    let (status, body) = get(&router, "/authors/Ursula%20K.%20Le%20Guin/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = get(&router, "/books?category=Cooking").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reservations_require_existing_patron_and_book() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();
    let user_id = register_user(&router).await;

    let (status, _) = post_form(
        &router,
        "/reservations",
        format!("user_id={user_id}&isbn=no-such-isbn"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_form(
        &router,
        "/reservations",
        format!("user_id={user_id}&isbn=isbn-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = get(&router, "/reservations/isbn-1").await;
    assert_eq!(status, StatusCode::OK);
    let queue = body.as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["status"], "PENDING");
}

#[tokio::test]
async fn stats_reflect_borrows() {
    let (router, services) = app();
    services.catalog.add_book(&book("isbn-1", 1)).await.unwrap();
    services.catalog.add_book(&book("isbn-2", 1)).await.unwrap();
    let user_id = register_user(&router).await;

    post_form(&router, "/borrows", format!("user_id={user_id}&isbn=isbn-1")).await;
    post_form(&router, "/borrows", format!("user_id={user_id}&isbn=isbn-2")).await;

    let (status, body) = get(&router, "/stats?top=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_borrows"], 2);
    assert_eq!(body["top_books"].as_array().unwrap().len(), 1);

    // Default keeps up to five entries.
    let (_, body) = get(&router, "/stats").await;
    assert_eq!(body["top_books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (router, _) = app();
    let (status, body) = get(&router, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Athenaeum API");
    assert!(body["paths"]["/borrows"].is_object());
}
