use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    CreateReviewParams, UpdateReviewParams, UpdateReviewStatusParams,
};
use crate::domain::entities::ReviewRecord;
use crate::domain::moderation::{ModerationPlan, plan_transition};
use crate::domain::types::{Actor, ReviewStatus};

use super::service::ReviewLifecycleService;
use super::types::{CreateReviewCommand, UpdateReviewCommand, ensure_comment, ensure_rating};

impl ReviewLifecycleService {
    /// Submit a new review. It starts in `Pending` and does not affect the
    /// product aggregate until approved, but the recompute still runs so
    /// the stored aggregate never drifts from the approved set.
    pub async fn create_review(
        &self,
        actor: Actor,
        command: CreateReviewCommand,
    ) -> Result<ReviewRecord, AppError> {
        ensure_rating(command.rating)?;
        ensure_comment(&command.comment)?;

        self.products
            .find_by_id(command.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("product"))?;

        // Best-effort pre-check; the store's unique index is what actually
        // wins a race between two concurrent submissions.
        if self
            .reader
            .exists_by_product_and_user(command.product_id, actor.user_id)
            .await?
        {
            return Err(AppError::DuplicateReview);
        }

        let review = self
            .writer
            .insert_review(CreateReviewParams {
                product_id: command.product_id,
                user_id: actor.user_id,
                rating: command.rating,
                comment: command.comment,
            })
            .await?;

        info!(
            review_id = %review.id,
            product_id = %review.product_id,
            user_id = %review.user_id,
            "created review"
        );

        self.aggregator.recompute(review.product_id).await?;
        self.cache.review_written(review.id).await;

        Ok(review)
    }

    /// Edit the rating or comment of an existing review. Owner only, and
    /// rejected reviews are immutable.
    pub async fn update_review(
        &self,
        actor: Actor,
        review_id: Uuid,
        command: UpdateReviewCommand,
    ) -> Result<ReviewRecord, AppError> {
        ensure_rating(command.rating)?;
        ensure_comment(&command.comment)?;

        let existing = self
            .reader
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("review"))?;

        if !actor.is_user(existing.user_id) {
            return Err(AppError::Unauthorized);
        }

        if existing.status == ReviewStatus::Rejected {
            return Err(AppError::validation("rejected reviews cannot be edited"));
        }

        if existing.product_id != command.product_id {
            return Err(AppError::validation(
                "review does not belong to the given product",
            ));
        }

        let review = self
            .writer
            .update_review(UpdateReviewParams {
                id: review_id,
                rating: command.rating,
                comment: command.comment,
            })
            .await?;

        info!(review_id = %review.id, "updated review");

        self.aggregator.recompute(review.product_id).await?;
        self.cache.review_written(review.id).await;

        Ok(review)
    }

    /// Delete a review. The owner may delete their own; admins may delete
    /// any.
    pub async fn delete_review(&self, actor: Actor, review_id: Uuid) -> Result<(), AppError> {
        let existing = self
            .reader
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("review"))?;

        if !actor.is_user(existing.user_id) && !actor.role.is_admin() {
            return Err(AppError::Unauthorized);
        }

        self.writer.delete_review(review_id).await?;
        info!(review_id = %review_id, "deleted review");

        self.aggregator.recompute(existing.product_id).await?;
        self.cache.review_written(review_id).await;

        Ok(())
    }

    /// Moderate a pending review to `Approved` or `Rejected`.
    ///
    /// Re-asserting the current status returns the review unchanged,
    /// without a store write, recompute, or eviction.
    pub async fn moderate_review(
        &self,
        actor: Actor,
        review_id: Uuid,
        target: ReviewStatus,
    ) -> Result<ReviewRecord, AppError> {
        if !actor.role.can_moderate() {
            return Err(AppError::Unauthorized);
        }

        let existing = self
            .reader
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("review"))?;

        match plan_transition(existing.status, target)? {
            ModerationPlan::Unchanged => Ok(existing),
            ModerationPlan::Transition => {
                let review = self
                    .writer
                    .update_review_status(UpdateReviewStatusParams {
                        id: review_id,
                        status: target,
                    })
                    .await?;

                info!(
                    review_id = %review.id,
                    status = %review.status,
                    moderator = %actor.user_id,
                    "moderated review"
                );

                self.aggregator.recompute(review.product_id).await?;
                self.cache.review_written(review.id).await;

                Ok(review)
            }
        }
    }
}
