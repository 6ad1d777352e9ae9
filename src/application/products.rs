//! Product catalog service.
//!
//! CRUD over the catalog plus cached reads. Writes are admin-only; the
//! aggregate fields on a product are never written here, they belong to
//! the rating aggregator.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{PageRequest, PageResponse, ProductSort};
use crate::application::repos::{
    CreateProductParams, ProductSearchFilter, ProductsRepo, ProductsWriteRepo, UpdateProductParams,
};
use crate::cache::{CacheCoherenceManager, CacheKey};
use crate::domain::entities::ProductRecord;
use crate::domain::types::Actor;

#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

fn ensure_catalog_fields(name: &str, price_cents: i64) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("product name must not be empty"));
    }
    if price_cents < 0 {
        return Err(AppError::validation("price must not be negative"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProductCatalogService {
    reader: Arc<dyn ProductsRepo>,
    writer: Arc<dyn ProductsWriteRepo>,
    cache: Arc<CacheCoherenceManager>,
}

impl ProductCatalogService {
    pub fn new(
        reader: Arc<dyn ProductsRepo>,
        writer: Arc<dyn ProductsWriteRepo>,
        cache: Arc<CacheCoherenceManager>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn create_product(
        &self,
        actor: Actor,
        command: CreateProductCommand,
    ) -> Result<ProductRecord, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Unauthorized);
        }
        ensure_catalog_fields(&command.name, command.price_cents)?;

        let product = self
            .writer
            .insert_product(CreateProductParams {
                name: command.name,
                description: command.description,
                category: command.category,
                price_cents: command.price_cents,
                image_url: command.image_url,
            })
            .await?;

        info!(product_id = %product.id, "created product");
        self.cache.product_created().await;

        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: Actor,
        product_id: Uuid,
        command: UpdateProductCommand,
    ) -> Result<ProductRecord, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Unauthorized);
        }
        ensure_catalog_fields(&command.name, command.price_cents)?;

        let product = self
            .writer
            .update_product(UpdateProductParams {
                id: product_id,
                name: command.name,
                description: command.description,
                category: command.category,
                price_cents: command.price_cents,
                image_url: command.image_url,
            })
            .await?;

        info!(product_id = %product.id, "updated product");
        self.cache.product_written(product.id).await;

        Ok(product)
    }

    pub async fn delete_product(&self, actor: Actor, product_id: Uuid) -> Result<(), AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Unauthorized);
        }

        self.writer.delete_product(product_id).await?;

        info!(product_id = %product_id, "deleted product");
        self.cache.product_written(product_id).await;

        Ok(())
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductRecord, AppError> {
        let key = CacheKey::product(product_id);
        if let Some(cached) = self.cache.get_json::<ProductRecord>(&key).await {
            return Ok(cached);
        }

        let product = self
            .reader
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("product"))?;

        self.cache.put_json(&key, &product).await;
        Ok(product)
    }

    pub async fn list_products(
        &self,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<PageResponse<ProductRecord>, AppError> {
        let key = CacheKey::product_list(page, sort);
        if let Some(cached) = self
            .cache
            .get_json::<PageResponse<ProductRecord>>(&key)
            .await
        {
            return Ok(cached);
        }

        let (items, total) = self.reader.list_products(page, sort).await?;
        let response = PageResponse::new(items, page, total);
        if !response.is_empty() {
            self.cache.put_json(&key, &response).await;
        }
        Ok(response)
    }

    pub async fn search_products(
        &self,
        filter: &ProductSearchFilter,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<PageResponse<ProductRecord>, AppError> {
        let key = CacheKey::product_search(filter, page, sort);
        if let Some(cached) = self
            .cache
            .get_json::<PageResponse<ProductRecord>>(&key)
            .await
        {
            return Ok(cached);
        }

        let (items, total) = self.reader.search_products(filter, page, sort).await?;
        let response = PageResponse::new(items, page, total);
        if !response.is_empty() {
            self.cache.put_json(&key, &response).await;
        }
        Ok(response)
    }
}
