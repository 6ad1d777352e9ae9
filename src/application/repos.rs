//! Repository traits describing persistence adapters.
//!
//! The engine consumes storage through these traits only; the Postgres
//! implementations live in `infra::db`, and tests substitute in-memory ones.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PaginationError, ProductSort};
use crate::domain::entities::{ProductRecord, ReviewRecord};
use crate::domain::types::ReviewStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateReviewParams {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct UpdateReviewParams {
    pub id: Uuid,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateReviewStatusParams {
    pub id: Uuid,
    pub status: ReviewStatus,
}

#[async_trait]
pub trait ReviewsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError>;

    /// Reviews for a product in the given status, newest first.
    async fn list_by_product_and_status(
        &self,
        product_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError>;

    /// All of a user's reviews regardless of status, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ReviewRecord>, RepoError>;

    async fn list_by_user_and_status(
        &self,
        user_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError>;

    async fn exists_by_product_and_user(
        &self,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait ReviewsWriteRepo: Send + Sync {
    /// Insert a new pending review. The store must enforce (product, user)
    /// uniqueness and report a racing second insert as [`RepoError::Duplicate`].
    async fn insert_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError>;

    async fn update_review(&self, params: UpdateReviewParams) -> Result<ReviewRecord, RepoError>;

    async fn update_review_status(
        &self,
        params: UpdateReviewStatusParams,
    ) -> Result<ReviewRecord, RepoError>;

    async fn delete_review(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, Default)]
pub struct ProductSearchFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProductParams {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    /// Returns the requested page plus the total row count for the listing.
    async fn list_products(
        &self,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError>;

    async fn search_products(
        &self,
        filter: &ProductSearchFilter,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn insert_product(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError>;

    async fn update_product(&self, params: UpdateProductParams) -> Result<ProductRecord, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError>;

    /// Persist the derived rating aggregate. Only the aggregator calls this.
    async fn update_aggregate(
        &self,
        product_id: Uuid,
        average_rating: Option<f64>,
        total_reviews: i64,
    ) -> Result<(), RepoError>;
}
