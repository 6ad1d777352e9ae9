//! Review lifecycle orchestration.
//!
//! Every write runs the same pipeline: validation and state-machine checks,
//! then the store write, then the aggregate recompute, then cache eviction.
//! Failures before the store write abort with nothing persisted; a store
//! failure aborts before the aggregate and cache steps run.

mod commands;
mod queries;
mod service;
pub mod types;

pub use service::ReviewLifecycleService;
pub use types::{CreateReviewCommand, UpdateReviewCommand};
