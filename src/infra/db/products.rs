use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, ProductSort};
use crate::application::repos::{
    CreateProductParams, ProductSearchFilter, ProductsRepo, ProductsWriteRepo, RepoError,
    UpdateProductParams,
};
use crate::domain::entities::ProductRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const PRODUCT_COLUMNS: &str = "id, name, description, category, price_cents, image_url, \
     average_rating, total_reviews, created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    price_cents: i64,
    image_url: Option<String>,
    average_rating: Option<f64>,
    total_reviews: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price_cents: row.price_cents,
            image_url: row.image_url,
            average_rating: row.average_rating,
            total_reviews: row.total_reviews,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn apply_search_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ProductSearchFilter) {
    if let Some(name) = filter.name.as_ref() {
        qb.push(" AND name ILIKE ");
        qb.push_bind(format!("%{name}%"));
    }
    if let Some(category) = filter.category.as_ref() {
        qb.push(" AND category ILIKE ");
        qb.push_bind(format!("%{category}%"));
    }
    if let Some(min) = filter.min_price_cents {
        qb.push(" AND price_cents >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.max_price_cents {
        qb.push(" AND price_cents <= ");
        qb.push_bind(max);
    }
}

fn push_order_and_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest, sort: ProductSort) {
    // Sort columns come from a closed enum, never from request text.
    qb.push(" ORDER BY ");
    qb.push(sort.field.as_column());
    qb.push(" ");
    qb.push(sort.direction.as_sql());
    qb.push(", id DESC");
    qb.push(" LIMIT ");
    qb.push_bind(page.limit() as i64);
    qb.push(" OFFSET ");
    qb.push_bind(page.offset() as i64);
}

fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn list_products(
        &self,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        push_order_and_page(&mut qb, page, sort);

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok((
            rows.into_iter().map(ProductRecord::from).collect(),
            convert_count(total)?,
        ))
    }

    async fn search_products(
        &self,
        filter: &ProductSearchFilter,
        page: PageRequest,
        sort: ProductSort,
    ) -> Result<(Vec<ProductRecord>, u64), RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        apply_search_filter(&mut qb, filter);
        push_order_and_page(&mut qb, page, sort);

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM products WHERE TRUE");
        apply_search_filter(&mut count_qb, filter);

        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok((
            rows.into_iter().map(ProductRecord::from).collect(),
            convert_count(total)?,
        ))
    }
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn insert_product(
        &self,
        params: CreateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
                 (id, name, description, category, price_cents, image_url, \
                  average_rating, total_reviews, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NULL, 0, $7, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.category)
        .bind(params.price_cents)
        .bind(params.image_url)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ProductRecord::from(row))
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products \
             SET name = $2, description = $3, category = $4, price_cents = $5, \
                 image_url = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.category)
        .bind(params.price_cents)
        .bind(params.image_url)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ProductRecord::from(row))
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn update_aggregate(
        &self,
        product_id: Uuid,
        average_rating: Option<f64>,
        total_reviews: i64,
    ) -> Result<(), RepoError> {
        let now = OffsetDateTime::now_utc();
        let result = sqlx::query(
            "UPDATE products SET average_rating = $2, total_reviews = $3, updated_at = $4 \
             WHERE id = $1",
        )
        .bind(product_id)
        .bind(average_rating)
        .bind(total_reviews)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
