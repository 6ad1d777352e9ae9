use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{PageRequest, PageResponse};
use crate::cache::CacheKey;
use crate::domain::entities::ReviewRecord;
use crate::domain::types::{Actor, ReviewStatus};

use super::service::ReviewLifecycleService;

impl ReviewLifecycleService {
    /// Single review by id, read through the cache.
    pub async fn get_review(&self, review_id: Uuid) -> Result<ReviewRecord, AppError> {
        let key = CacheKey::review(review_id);
        if let Some(cached) = self.cache.get_json::<ReviewRecord>(&key).await {
            return Ok(cached);
        }

        let review = self
            .reader
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("review"))?;

        self.cache.put_json(&key, &review).await;
        Ok(review)
    }

    /// Approved reviews for a product, newest first.
    ///
    /// The approved set is fetched whole and sliced in memory; review
    /// volume per product is moderate and the whole page is cached anyway.
    pub async fn reviews_by_product(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<ReviewRecord>, AppError> {
        let key = CacheKey::reviews_by_product(product_id, page);
        if let Some(cached) = self.cache.get_json::<PageResponse<ReviewRecord>>(&key).await {
            return Ok(cached);
        }

        let approved = self
            .reader
            .list_by_product_and_status(product_id, ReviewStatus::Approved)
            .await?;

        let total = approved.len() as u64;
        let start = usize::try_from(page.offset().min(total)).unwrap_or(approved.len());
        let end = (start + page.limit() as usize).min(approved.len());
        let items = approved[start..end].to_vec();

        let response = PageResponse::new(items, page, total);
        if !response.is_empty() {
            self.cache.put_json(&key, &response).await;
        }
        Ok(response)
    }

    /// A user's reviews. The subject sees all of their own reviews; anyone
    /// else sees approved ones only. The cache key carries the viewer so
    /// the two projections never collide.
    pub async fn reviews_by_user(
        &self,
        user_id: Uuid,
        actor: Actor,
    ) -> Result<Vec<ReviewRecord>, AppError> {
        let key = CacheKey::reviews_by_user(user_id, actor.user_id);
        if let Some(cached) = self.cache.get_json::<Vec<ReviewRecord>>(&key).await {
            return Ok(cached);
        }

        let reviews = if actor.is_user(user_id) {
            self.reader.list_by_user(user_id).await?
        } else {
            self.reader
                .list_by_user_and_status(user_id, ReviewStatus::Approved)
                .await?
        };

        if !reviews.is_empty() {
            self.cache.put_json(&key, &reviews).await;
        }
        Ok(reviews)
    }
}
