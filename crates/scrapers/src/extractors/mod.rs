// ABOUTME: Field extraction for listing fragments: selectors, normalizers and rating fallback.
// ABOUTME: Everything here is pure apart from the seeded rating generator.

//! Field extraction module.
//!
//! Submodules:
//! - `compiled`: process-wide cache of parsed CSS selectors.
//! - `select`: ordered fallback chains of selectors scoped to one fragment.
//! - `normalize`: price, rating, review count and query normalization.
//! - `rating`: synthesized ratings for listings without one.

pub mod compiled;
pub mod normalize;
pub mod rating;
pub mod select;
