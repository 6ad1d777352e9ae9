use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateReviewParams, RepoError, ReviewsRepo, ReviewsWriteRepo, UpdateReviewParams,
    UpdateReviewStatusParams,
};
use crate::domain::entities::ReviewRecord;
use crate::domain::types::ReviewStatus;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, rating, comment, status, created_at, updated_at";

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: String,
    status: ReviewStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ReviewsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ReviewRecord::from))
    }

    async fn list_by_product_and_status(
        &self,
        product_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE product_id = $1 AND status = $2 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(product_id)
        .bind(status)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ReviewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }

    async fn list_by_user_and_status(
        &self,
        user_id: Uuid,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(status)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }

    async fn exists_by_product_and_user(
        &self,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE product_id = $1 AND user_id = $2)",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(exists.0)
    }
}

#[async_trait]
impl ReviewsWriteRepo for PostgresRepositories {
    async fn insert_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (id, product_id, user_id, rating, comment, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(params.product_id)
        .bind(params.user_id)
        .bind(params.rating)
        .bind(params.comment)
        .bind(ReviewStatus::Pending)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ReviewRecord::from(row))
    }

    async fn update_review(&self, params: UpdateReviewParams) -> Result<ReviewRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = $4 \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.rating)
        .bind(params.comment)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ReviewRecord::from(row))
    }

    async fn update_review_status(
        &self,
        params: UpdateReviewStatusParams,
    ) -> Result<ReviewRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET status = $2, updated_at = $3 \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.status)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ReviewRecord::from(row))
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
