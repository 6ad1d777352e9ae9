//! Shared test fixtures: in-memory repository implementations and a fully
//! wired service environment backed by the real in-memory cache.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use recensio::application::aggregate::RatingAggregator;
use recensio::application::pagination::{PageRequest, ProductSort, SortDirection};
use recensio::application::products::{CreateProductCommand, ProductCatalogService};
use recensio::application::repos::{
    CreateProductParams, CreateReviewParams, ProductSearchFilter, ProductsRepo, ProductsWriteRepo,
    RepoError, ReviewsRepo, ReviewsWriteRepo, UpdateProductParams, UpdateReviewParams,
    UpdateReviewStatusParams,
};
use recensio::application::reviews::{CreateReviewCommand, ReviewLifecycleService};
use recensio::cache::{
    CacheBackend, CacheCoherenceManager, CacheConfig, CacheError, MemoryCache,
};
use recensio::domain::entities::{ProductRecord, ReviewRecord};
use recensio::domain::types::{Actor, ReviewStatus, Role};

// ============================================================================
// In-memory repositories
// ============================================================================

struct StoredReview {
    record: ReviewRecord,
    seq: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    reviews: Mutex<HashMap<Uuid, StoredReview>>,
    products: Mutex<HashMap<Uuid, ProductRecord>>,
    seq: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn reviews(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, StoredReview>> {
        self.reviews.lock().expect("reviews lock")
    }

    fn products(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ProductRecord>> {
        self.products.lock().expect("products lock")
    }

    /// Current aggregate fields for a product, straight from the store.
    pub fn product_aggregate(&self, product_id: Uuid) -> (Option<f64>, i64) {
        let products = self.products();
        let product = products.get(&product_id).expect("product exists");
        (product.average_rating, product.total_reviews)
    }

    fn sorted_reviews(&self, mut matching: Vec<(i64, ReviewRecord)>) -> Vec<ReviewRecord> {
        matching.sort_by(|a, b| b.0.cmp(&a.0));
        matching.into_iter().map(|(_, record)| record).collect()
    }
}

#[async_trait]
impl ReviewsRepo for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError> {
        Ok(self.reviews().get(&id).map(|stored| stored.record.clone()))
    }

    async fn list_by_product_and_status(
        &self,
        product_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let matching = self
            .reviews()
            .values()
            .filter(|stored| {
                stored.record.product_id == product_id && stored.record.status == status
            })
            .map(|stored| (stored.seq, stored.record.clone()))
            .collect();
        Ok(self.sorted_reviews(matching))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ReviewRecord>, RepoError> {
        let matching = self
            .reviews()
            .values()
            .filter(|stored| stored.record.user_id == user_id)
            .map(|stored| (stored.seq, stored.record.clone()))
            .collect();
        Ok(self.sorted_reviews(matching))
    }

    async fn list_by_user_and_status(
        &self,
        user_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let matching = self
            .reviews()
            .values()
            .filter(|stored| stored.record.user_id == user_id && stored.record.status == status)
            .map(|stored| (stored.seq, stored.record.clone()))
            .collect();
        Ok(self.sorted_reviews(matching))
    }

    async fn exists_by_product_and_user(
        &self,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError> {
        Ok(self.reviews().values().any(|stored| {
            stored.record.product_id == product_id && stored.record.user_id == user_id
        }))
    }
}

#[async_trait]
impl ReviewsWriteRepo for InMemoryStore {
    async fn insert_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError> {
        let mut reviews = self.reviews();
        // Mirror the unique index on (product_id, user_id).
        if reviews.values().any(|stored| {
            stored.record.product_id == params.product_id
                && stored.record.user_id == params.user_id
        }) {
            return Err(RepoError::Duplicate {
                constraint: "reviews_product_user_idx".to_string(),
            });
        }

        let now = OffsetDateTime::now_utc();
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            product_id: params.product_id,
            user_id: params.user_id,
            rating: params.rating,
            comment: params.comment,
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        reviews.insert(
            record.id,
            StoredReview {
                record: record.clone(),
                seq: self.next_seq(),
            },
        );
        Ok(record)
    }

    async fn update_review(&self, params: UpdateReviewParams) -> Result<ReviewRecord, RepoError> {
        let mut reviews = self.reviews();
        let stored = reviews.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        stored.record.rating = params.rating;
        stored.record.comment = params.comment;
        stored.record.updated_at = OffsetDateTime::now_utc();
        Ok(stored.record.clone())
    }

    async fn update_review_status(
        &self,
        params: UpdateReviewStatusParams,
    ) -> Result<ReviewRecord, RepoError> {
        let mut reviews = self.reviews();
        let stored = reviews.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        stored.record.status = params.status;
        stored.record.updated_at = OffsetDateTime::now_utc();
        Ok(stored.record.clone())
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), RepoError> {
        self.reviews()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

fn compare_products(a: &ProductRecord, b: &ProductRecord, sort: ProductSort) -> std::cmp::Ordering {
    use recensio::application::pagination::ProductSortField;

    let ordering = match sort.field {
        ProductSortField::Name => a.name.cmp(&b.name),
        ProductSortField::Price => a.price_cents.cmp(&b.price_cents),
        ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ProductSortField::AverageRating => a
            .average_rating
            .partial_cmp(&b.average_rating)
            .unwrap_or(std::cmp::Ordering::Equal),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn paginate(records: Vec<ProductRecord>, page: PageRequest) -> (Vec<ProductRecord>, u64) {
    let total = records.len() as u64;
    let start = (page.offset() as usize).min(records.len());
    let end = (start + page.limit() as usize).min(records.len());
    (records[start..end].to_vec(), total)
}

#[async_trait]
impl ProductsRepo for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self.products().get(&id).cloned())
    }

    async fn list_products(
        &self,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError> {
        let mut records: Vec<ProductRecord> = self.products().values().cloned().collect();
        records.sort_by(|a, b| compare_products(a, b, sort));
        Ok(paginate(records, page))
    }

    async fn search_products(
        &self,
        filter: &ProductSearchFilter,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError> {
        let matches = |product: &ProductRecord| {
            let name_ok = filter.name.as_ref().is_none_or(|name| {
                product.name.to_lowercase().contains(&name.to_lowercase())
            });
            let category_ok = filter.category.as_ref().is_none_or(|category| {
                product
                    .category
                    .to_lowercase()
                    .contains(&category.to_lowercase())
            });
            let min_ok = filter
                .min_price_cents
                .is_none_or(|min| product.price_cents >= min);
            let max_ok = filter
                .max_price_cents
                .is_none_or(|max| product.price_cents <= max);
            name_ok && category_ok && min_ok && max_ok
        };

        let mut records: Vec<ProductRecord> = self
            .products()
            .values()
            .filter(|product| matches(product))
            .cloned()
            .collect();
        records.sort_by(|a, b| compare_products(a, b, sort));
        Ok(paginate(records, page))
    }
}

#[async_trait]
impl ProductsWriteRepo for InMemoryStore {
    async fn insert_product(
        &self,
        params: CreateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = ProductRecord {
            id: Uuid::new_v4(),
            name: params.name,
            description: params.description,
            category: params.category,
            price_cents: params.price_cents,
            image_url: params.image_url,
            average_rating: None,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.products().insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let mut products = self.products();
        let record = products.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        record.name = params.name;
        record.description = params.description;
        record.category = params.category;
        record.price_cents = params.price_cents;
        record.image_url = params.image_url;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        self.products()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn update_aggregate(
        &self,
        product_id: Uuid,
        average_rating: Option<f64>,
        total_reviews: i64,
    ) -> Result<(), RepoError> {
        let mut products = self.products();
        let record = products.get_mut(&product_id).ok_or(RepoError::NotFound)?;
        record.average_rating = average_rating;
        record.total_reviews = total_reviews;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

// ============================================================================
// Failing cache backend
// ============================================================================

/// A backend that fails every call, for exercising cache degradation.
pub struct FailingBackend;

#[async_trait]
impl CacheBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    async fn evict(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Timeout)
    }

    async fn evict_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Err(CacheError::Timeout)
    }
}

// ============================================================================
// Wired environment
// ============================================================================

pub struct TestEnv {
    pub store: Arc<InMemoryStore>,
    pub backend: Arc<MemoryCache>,
    pub cache: Arc<CacheCoherenceManager>,
    pub aggregator: Arc<RatingAggregator>,
    pub reviews: ReviewLifecycleService,
    pub products: ProductCatalogService,
}

pub fn test_env() -> TestEnv {
    let config = CacheConfig::default();
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(MemoryCache::new(&config));
    build_env(store, backend.clone(), backend, config)
}

pub fn test_env_with_failing_cache() -> TestEnv {
    let config = CacheConfig::default();
    let store = Arc::new(InMemoryStore::new());
    // The MemoryCache handle is unused in this variant; keep one around so
    // TestEnv has a uniform shape.
    let unused = Arc::new(MemoryCache::new(&config));
    build_env(store, unused, Arc::new(FailingBackend), config)
}

fn build_env(
    store: Arc<InMemoryStore>,
    backend_handle: Arc<MemoryCache>,
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
) -> TestEnv {
    let cache = Arc::new(CacheCoherenceManager::new(config, backend));
    let aggregator = Arc::new(RatingAggregator::new(
        store.clone(),
        store.clone(),
        cache.clone(),
    ));
    let reviews = ReviewLifecycleService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        aggregator.clone(),
        cache.clone(),
    );
    let products = ProductCatalogService::new(store.clone(), store.clone(), cache.clone());

    TestEnv {
        store,
        backend: backend_handle,
        cache,
        aggregator,
        reviews,
        products,
    }
}

// ============================================================================
// Actors and fixtures
// ============================================================================

pub fn customer() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Customer)
}

pub fn moderator() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Moderator)
}

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

pub async fn seed_product(env: &TestEnv, name: &str) -> ProductRecord {
    env.products
        .create_product(
            admin(),
            CreateProductCommand {
                name: name.to_string(),
                description: format!("{name} description"),
                category: "general".to_string(),
                price_cents: 1999,
                image_url: None,
            },
        )
        .await
        .expect("seed product")
}

pub async fn submit_review(
    env: &TestEnv,
    actor: Actor,
    product_id: Uuid,
    rating: i32,
) -> ReviewRecord {
    env.reviews
        .create_review(
            actor,
            CreateReviewCommand {
                product_id,
                rating,
                comment: format!("rated {rating}"),
            },
        )
        .await
        .expect("submit review")
}

pub async fn submit_approved_review(
    env: &TestEnv,
    actor: Actor,
    product_id: Uuid,
    rating: i32,
) -> ReviewRecord {
    let review = submit_review(env, actor, product_id, rating).await;
    env.reviews
        .moderate_review(moderator(), review.id, ReviewStatus::Approved)
        .await
        .expect("approve review")
}
