use std::sync::Arc;

use crate::application::aggregate::RatingAggregator;
use crate::application::repos::{ProductsRepo, ReviewsRepo, ReviewsWriteRepo};
use crate::cache::CacheCoherenceManager;

#[derive(Clone)]
pub struct ReviewLifecycleService {
    pub(crate) reader: Arc<dyn ReviewsRepo>,
    pub(crate) writer: Arc<dyn ReviewsWriteRepo>,
    pub(crate) products: Arc<dyn ProductsRepo>,
    pub(crate) aggregator: Arc<RatingAggregator>,
    pub(crate) cache: Arc<CacheCoherenceManager>,
}

impl ReviewLifecycleService {
    pub fn new(
        reader: Arc<dyn ReviewsRepo>,
        writer: Arc<dyn ReviewsWriteRepo>,
        products: Arc<dyn ProductsRepo>,
        aggregator: Arc<RatingAggregator>,
        cache: Arc<CacheCoherenceManager>,
    ) -> Self {
        Self {
            reader,
            writer,
            products,
            aggregator,
            cache,
        }
    }
}
