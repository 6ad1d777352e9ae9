use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::PageResponse;
use crate::application::reviews::{CreateReviewCommand, UpdateReviewCommand};
use crate::domain::entities::ReviewRecord;
use crate::domain::types::{Actor, ReviewStatus};

use super::{ApiState, ListingQuery};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateReviewBody {
    product_id: Uuid,
    rating: i32,
    comment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateReviewBody {
    product_id: Uuid,
    rating: i32,
    comment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerateBody {
    status: ReviewStatus,
}

pub(crate) async fn create_review(
    State(state): State<ApiState>,
    actor: Actor,
    Json(body): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<ReviewRecord>), AppError> {
    let review = state
        .reviews
        .create_review(
            actor,
            CreateReviewCommand {
                product_id: body.product_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub(crate) async fn update_review(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateReviewBody>,
) -> Result<Json<ReviewRecord>, AppError> {
    let review = state
        .reviews
        .update_review(
            actor,
            id,
            UpdateReviewCommand {
                product_id: body.product_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok(Json(review))
}

pub(crate) async fn delete_review(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.reviews.delete_review(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn moderate_review(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<ModerateBody>,
) -> Result<Json<ReviewRecord>, AppError> {
    let review = state.reviews.moderate_review(actor, id, body.status).await?;
    Ok(Json(review))
}

pub(crate) async fn get_review(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewRecord>, AppError> {
    Ok(Json(state.reviews.get_review(id).await?))
}

pub(crate) async fn reviews_by_product(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PageResponse<ReviewRecord>>, AppError> {
    let page = query.page_request()?;
    Ok(Json(state.reviews.reviews_by_product(id, page).await?))
}

pub(crate) async fn reviews_by_user(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewRecord>>, AppError> {
    Ok(Json(state.reviews.reviews_by_user(id, actor).await?))
}
