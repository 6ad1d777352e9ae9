//! Router-level tests: actor extraction, error mapping, and a full
//! create → moderate → read pass through the JSON API.

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use common::{admin, customer, moderator, test_env};
use recensio::domain::types::Actor;
use recensio::infra::http::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, ApiState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

fn router() -> Router {
    let env = test_env();
    build_router(ApiState {
        products: Arc::new(env.products.clone()),
        reviews: Arc::new(env.reviews.clone()),
    })
}

fn request(method: &str, uri: &str, actor: Option<Actor>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        let role = match actor.role {
            recensio::domain::types::Role::Customer => "customer",
            recensio::domain::types::Role::Moderator => "moderator",
            recensio::domain::types::Role::Admin => "admin",
        };
        builder = builder
            .header(ACTOR_ID_HEADER, actor.user_id.to_string())
            .header(ACTOR_ROLE_HEADER, role);
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn healthz_responds_ok() {
    let response = router()
        .oneshot(request("GET", "/healthz", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn mutations_require_an_actor_identity() {
    let response = router()
        .oneshot(request(
            "POST",
            "/reviews",
            None,
            Some(json!({"product_id": uuid::Uuid::new_v4(), "rating": 4, "comment": "hi"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_sort_fields_are_bad_requests() {
    let response = router()
        .oneshot(request("GET", "/products?sort_by=password", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_review_flow_over_the_api() {
    let app = router();
    let reviewer = customer();

    // Admin creates a product.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/products",
            Some(admin()),
            Some(json!({"name": "mug", "price_cents": 1999})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let product = body_json(response).await;
    let product_id = product["id"].as_str().expect("product id").to_string();
    assert!(product["average_rating"].is_null());

    // Customer submits a review; it comes back pending.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/reviews",
            Some(reviewer),
            Some(json!({"product_id": product_id, "rating": 4, "comment": "solid"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = body_json(response).await;
    assert_eq!(review["status"], "pending");
    let review_id = review["id"].as_str().expect("review id").to_string();

    // A customer may not moderate.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/reviews/{review_id}/moderate"),
            Some(reviewer),
            Some(json!({"status": "approved"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A moderator approves.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/reviews/{review_id}/moderate"),
            Some(moderator()),
            Some(json!({"status": "approved"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "approved");

    // The product read now reflects the aggregate.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/products/{product_id}"),
            None,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let product = body_json(response).await;
    assert_eq!(product["average_rating"], json!(4.0));
    assert_eq!(product["total_reviews"], json!(1));

    // Approved reviews are listed publicly.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/products/{product_id}/reviews"),
            None,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["total_items"], json!(1));

    // Moderating again from a terminal state conflicts.
    let response = app
        .oneshot(request(
            "POST",
            &format!("/reviews/{review_id}/moderate"),
            Some(moderator()),
            Some(json!({"status": "rejected"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn non_admins_cannot_manage_the_catalog() {
    let response = router()
        .oneshot(request(
            "POST",
            "/products",
            Some(customer()),
            Some(json!({"name": "mug", "price_cents": 100})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
