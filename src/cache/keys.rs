//! Canonical cache key construction.
//!
//! A key is a deterministic function of the operation and its full
//! parameter set: two semantically identical calls always render the same
//! key, and changing any single parameter changes it. Absent optional
//! parameters render as the literal `null` sentinel so that "no filter"
//! and "filter on the string value" never collide silently.
//!
//! Keys are namespaced by domain prefix, which is what whole-domain
//! eviction operates on.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::application::pagination::{PageRequest, ProductSort};
use crate::application::repos::ProductSearchFilter;

const NULL_SENTINEL: &str = "null";
const SEGMENT_SEPARATOR: char = ':';

/// A named grouping of cache keys sharing a TTL and invalidation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    ProductById,
    ProductList,
    ProductSearch,
    ReviewById,
    ReviewsByProduct,
    ReviewsByUser,
}

impl CacheDomain {
    pub fn prefix(self) -> &'static str {
        match self {
            CacheDomain::ProductById => "product",
            CacheDomain::ProductList => "product-list",
            CacheDomain::ProductSearch => "product-search",
            CacheDomain::ReviewById => "review",
            CacheDomain::ReviewsByProduct => "reviews-by-product",
            CacheDomain::ReviewsByUser => "reviews-by-user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    domain: CacheDomain,
    rendered: String,
}

impl CacheKey {
    fn build(domain: CacheDomain, segments: &[&dyn std::fmt::Display]) -> Self {
        let mut rendered = String::from(domain.prefix());
        for segment in segments {
            let _ = write!(rendered, "{SEGMENT_SEPARATOR}{segment}");
        }
        Self { domain, rendered }
    }

    pub fn domain(&self) -> CacheDomain {
        self.domain
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn product(id: Uuid) -> Self {
        Self::build(CacheDomain::ProductById, &[&id])
    }

    pub fn product_list(page: PageRequest, sort: ProductSort) -> Self {
        Self::build(
            CacheDomain::ProductList,
            &[
                &page.page(),
                &page.size(),
                &sort.field.as_str(),
                &sort.direction.as_str(),
            ],
        )
    }

    pub fn product_search(
        filter: &ProductSearchFilter,
        page: PageRequest,
        sort: ProductSort,
    ) -> Self {
        Self::build(
            CacheDomain::ProductSearch,
            &[
                &opt(filter.name.as_deref()),
                &opt(filter.category.as_deref()),
                &opt(filter.min_price_cents),
                &opt(filter.max_price_cents),
                &page.page(),
                &page.size(),
                &sort.field.as_str(),
                &sort.direction.as_str(),
            ],
        )
    }

    pub fn review(id: Uuid) -> Self {
        Self::build(CacheDomain::ReviewById, &[&id])
    }

    pub fn reviews_by_product(product_id: Uuid, page: PageRequest) -> Self {
        Self::build(
            CacheDomain::ReviewsByProduct,
            &[&product_id, &page.page(), &page.size()],
        )
    }

    /// Keyed on subject *and* viewer: the same user list renders
    /// differently depending on who is looking (owners see every status).
    pub fn reviews_by_user(user_id: Uuid, viewer_id: Uuid) -> Self {
        Self::build(CacheDomain::ReviewsByUser, &[&user_id, &viewer_id])
    }
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => NULL_SENTINEL.to_string(),
    }
}
