//! Moderation state machine for reviews.
//!
//! A review starts in `Pending` and is moderated exactly once: to `Approved`
//! or to `Rejected`. Both outcomes are terminal. Re-asserting the current
//! status is an idempotent no-op rather than an error, so moderation retries
//! are safe.
//!
//! Ownership and role checks are the orchestrator's concern; this module
//! only decides whether a status transition is legal.

use thiserror::Error;

use crate::domain::types::ReviewStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("review in status `{current}` can no longer be moderated")]
    Terminal { current: ReviewStatus },
    #[error("`{target}` is not a valid moderation target")]
    InvalidTarget { target: ReviewStatus },
}

/// Outcome of validating a moderation request against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationPlan {
    /// Target equals the current status: return the review unchanged,
    /// without a store write, aggregate recompute, or cache eviction.
    Unchanged,
    /// Legal transition out of `Pending`: persist the new status.
    Transition,
}

/// Validate a moderation request.
///
/// The idempotent short-circuit is checked first, so re-approving an
/// approved review succeeds even though `Approved` is terminal.
pub fn plan_transition(
    current: ReviewStatus,
    target: ReviewStatus,
) -> Result<ModerationPlan, TransitionError> {
    if current == target {
        return Ok(ModerationPlan::Unchanged);
    }

    if current.is_terminal() {
        return Err(TransitionError::Terminal { current });
    }

    match target {
        ReviewStatus::Approved | ReviewStatus::Rejected => Ok(ModerationPlan::Transition),
        ReviewStatus::Pending => Err(TransitionError::InvalidTarget { target }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ReviewStatus::{Approved, Pending, Rejected};

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(plan_transition(Pending, Approved), Ok(ModerationPlan::Transition));
        assert_eq!(plan_transition(Pending, Rejected), Ok(ModerationPlan::Transition));
    }

    #[test]
    fn same_status_is_idempotent_for_every_state() {
        for status in [Pending, Approved, Rejected] {
            assert_eq!(plan_transition(status, status), Ok(ModerationPlan::Unchanged));
        }
    }

    #[test]
    fn terminal_states_reject_any_change() {
        assert_eq!(
            plan_transition(Approved, Rejected),
            Err(TransitionError::Terminal { current: Approved })
        );
        assert_eq!(
            plan_transition(Rejected, Approved),
            Err(TransitionError::Terminal { current: Rejected })
        );
        assert_eq!(
            plan_transition(Approved, Pending),
            Err(TransitionError::Terminal { current: Approved })
        );
    }
}
