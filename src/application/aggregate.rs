//! Derived rating aggregate.
//!
//! A product's `(average_rating, total_reviews)` pair is recomputed
//! wholesale from its approved reviews after every mutation that can change
//! that set: creation, a rating edit, deletion, and any moderation that
//! moves a review into or out of `Approved`. Full recomputation trades a
//! little efficiency for not having to reason about compensating deltas; at
//! larger volumes a running sum/count adjusted per transition would produce
//! the same observable values.

use std::sync::Arc;

use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::application::locks::ProductWriteLocks;
use crate::application::repos::{ProductsWriteRepo, RepoError, ReviewsRepo};
use crate::cache::CacheCoherenceManager;
use crate::domain::types::ReviewStatus;

pub(crate) const METRIC_AGGREGATE_RECOMPUTE: &str = "recensio_aggregate_recompute_total";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// None when the product has no approved reviews.
    pub average_rating: Option<f64>,
    pub total_reviews: i64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average_rating: None,
            total_reviews: 0,
        }
    }
}

/// Average and count over a set of ratings.
pub fn summarize_ratings(ratings: &[i32]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::empty();
    }
    let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();
    RatingSummary {
        average_rating: Some(sum as f64 / ratings.len() as f64),
        total_reviews: ratings.len() as i64,
    }
}

pub struct RatingAggregator {
    reviews: Arc<dyn ReviewsRepo>,
    products: Arc<dyn ProductsWriteRepo>,
    locks: ProductWriteLocks,
    cache: Arc<CacheCoherenceManager>,
}

impl RatingAggregator {
    pub fn new(
        reviews: Arc<dyn ReviewsRepo>,
        products: Arc<dyn ProductsWriteRepo>,
        cache: Arc<CacheCoherenceManager>,
    ) -> Self {
        Self {
            reviews,
            products,
            locks: ProductWriteLocks::new(),
            cache,
        }
    }

    /// Recompute and persist the aggregate for one product.
    ///
    /// The read-recompute-write span holds the product's write lock, so
    /// concurrent review writes on the same product cannot interleave and
    /// lose an update. The product cache is evicted only after the durable
    /// write succeeds.
    pub async fn recompute(&self, product_id: Uuid) -> Result<RatingSummary, RepoError> {
        let _guard = self.locks.acquire(product_id).await;

        let approved = self
            .reviews
            .list_by_product_and_status(product_id, ReviewStatus::Approved)
            .await?;
        let ratings: Vec<i32> = approved.iter().map(|review| review.rating).collect();
        let summary = summarize_ratings(&ratings);

        self.products
            .update_aggregate(product_id, summary.average_rating, summary.total_reviews)
            .await?;

        counter!(METRIC_AGGREGATE_RECOMPUTE).increment(1);
        info!(
            product_id = %product_id,
            average_rating = ?summary.average_rating,
            total_reviews = summary.total_reviews,
            "recomputed product rating aggregate"
        );

        self.cache.product_written(product_id).await;

        Ok(summary)
    }
}
