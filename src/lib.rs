//! Recensio — a self-hosted product review service.
//!
//! The interesting part of this crate is the review-lifecycle engine:
//!
//! - [`domain::moderation`] enforces the moderation state machine that
//!   governs a review's public visibility.
//! - [`application::aggregate`] recomputes the per-product rating aggregate
//!   whenever the set of approved reviews changes, serialized per product.
//! - [`cache`] keeps a read-through cache coherent with those writes and
//!   degrades gracefully when the backend is unavailable.
//!
//! Everything else (HTTP surface, Postgres repositories, configuration) is
//! conventional plumbing around that engine.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
