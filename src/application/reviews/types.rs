use uuid::Uuid;

use crate::application::error::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone)]
pub struct CreateReviewCommand {
    pub product_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

/// The product id is carried along and checked against the stored review,
/// so a caller cannot move a review to another product by accident.
#[derive(Debug, Clone)]
pub struct UpdateReviewCommand {
    pub product_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

pub fn ensure_rating(rating: i32) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

pub fn ensure_comment(comment: &str) -> Result<(), AppError> {
    if comment.trim().is_empty() {
        return Err(AppError::validation("comment must not be empty"));
    }
    Ok(())
}
