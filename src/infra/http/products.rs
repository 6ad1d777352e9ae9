use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::PageResponse;
use crate::application::products::{CreateProductCommand, UpdateProductCommand};
use crate::application::repos::ProductSearchFilter;
use crate::domain::entities::ProductRecord;
use crate::domain::types::Actor;

use super::{ApiState, ListingQuery};

#[derive(Debug, Deserialize)]
pub(crate) struct ProductBody {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    price_cents: i64,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    name: Option<String>,
    category: Option<String>,
    min_price_cents: Option<i64>,
    max_price_cents: Option<i64>,
    page: Option<u32>,
    size: Option<u32>,
    sort_by: Option<String>,
    direction: Option<String>,
}

impl SearchQuery {
    fn listing(&self) -> ListingQuery {
        ListingQuery {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            direction: self.direction.clone(),
        }
    }
}

pub(crate) async fn create_product(
    State(state): State<ApiState>,
    actor: Actor,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<ProductRecord>), AppError> {
    let product = state
        .products
        .create_product(
            actor,
            CreateProductCommand {
                name: body.name,
                description: body.description,
                category: body.category,
                price_cents: body.price_cents,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(crate) async fn update_product(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductRecord>, AppError> {
    let product = state
        .products
        .update_product(
            actor,
            id,
            UpdateProductCommand {
                name: body.name,
                description: body.description,
                category: body.category,
                price_cents: body.price_cents,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok(Json(product))
}

pub(crate) async fn delete_product(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.products.delete_product(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductRecord>, AppError> {
    Ok(Json(state.products.get_product(id).await?))
}

pub(crate) async fn list_products(
    State(state): State<ApiState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PageResponse<ProductRecord>>, AppError> {
    let page = query.page_request()?;
    let sort = query.product_sort()?;
    Ok(Json(state.products.list_products(page, sort).await?))
}

pub(crate) async fn search_products(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PageResponse<ProductRecord>>, AppError> {
    let listing = query.listing();
    let page = listing.page_request()?;
    let sort = listing.product_sort()?;
    let filter = ProductSearchFilter {
        name: query.name,
        category: query.category,
        min_price_cents: query.min_price_cents,
        max_price_cents: query.max_price_cents,
    };
    Ok(Json(state.products.search_products(&filter, page, sort).await?))
}
