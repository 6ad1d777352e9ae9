//! HTTP surface.
//!
//! Thin axum layer over the application services: extract parameters,
//! resolve the acting user from gateway headers, call the service, shape
//! the JSON response. Authentication itself happens upstream; this layer
//! only trusts the identity headers the gateway injects.

mod products;
mod reviews;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{
    DEFAULT_PAGE_SIZE, PageRequest, ProductSort, SortDirection,
};
use crate::application::products::ProductCatalogService;
use crate::application::reviews::ReviewLifecycleService;
use crate::domain::types::{Actor, Role};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

#[derive(Clone)]
pub struct ApiState {
    pub products: Arc<ProductCatalogService>,
    pub reviews: Arc<ReviewLifecycleService>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/search", get(products::search_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{id}/reviews", get(reviews::reviews_by_product))
        .route("/reviews", post(reviews::create_review))
        .route(
            "/reviews/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/reviews/{id}/moderate", post(reviews::moderate_review))
        .route("/users/{id}/reviews", get(reviews::reviews_by_user))
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

// ============================================================================
// Actor extraction
// ============================================================================

fn parse_role(value: &str) -> Option<Role> {
    match value.to_ascii_lowercase().as_str() {
        "customer" => Some(Role::Customer),
        "moderator" => Some(Role::Moderator),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing or invalid actor identity"))?;

        let role = match parts.headers.get(ACTOR_ROLE_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(parse_role)
                .ok_or((StatusCode::UNAUTHORIZED, "unknown actor role"))?,
            None => Role::Customer,
        };

        Ok(Actor::new(user_id, role))
    }
}

// ============================================================================
// Shared listing query parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ListingQuery {
    page: Option<u32>,
    size: Option<u32>,
    sort_by: Option<String>,
    direction: Option<String>,
}

impl ListingQuery {
    pub(crate) fn page_request(&self) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        PageRequest::new(page, size).map_err(|err| AppError::validation(err.to_string()))
    }

    pub(crate) fn product_sort(&self) -> Result<ProductSort, AppError> {
        let mut sort = ProductSort::default();
        if let Some(field) = self.sort_by.as_deref() {
            sort.field = field
                .parse()
                .map_err(|()| AppError::validation(format!("unknown sort field `{field}`")))?;
        }
        if let Some(direction) = self.direction.as_deref() {
            sort.direction = direction.parse::<SortDirection>().map_err(|()| {
                AppError::validation(format!("unknown sort direction `{direction}`"))
            })?;
        }
        Ok(sort)
    }
}
