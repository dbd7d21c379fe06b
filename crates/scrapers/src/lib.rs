// ABOUTME: Library entry point for the SmartyShop site scrapers.
// ABOUTME: Re-exports Product, Site, the SiteAdapter capability, the registry and the HTTP fetcher.

//! SmartyShop scrapers - first-page product listings from Turkish e-commerce sites.
//!
//! Each supported shop is a [`ListingRules`] implementation driven by the
//! generic [`ListingScraper`]. The [`ScraperRegistry`] maps site identifiers
//! to ready [`SiteAdapter`]s.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartyshop_scrapers::{
//!     HttpFetcher, RatingFallback, ScrapeError, ScraperRegistry, DEFAULT_USER_AGENT,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let fetcher = Arc::new(HttpFetcher::builder().build()?);
//!     let registry =
//!         ScraperRegistry::builtin(fetcher, Arc::new(RatingFallback::from_os()), DEFAULT_USER_AGENT);
//!     if let Some(adapter) = registry.get("trendyol") {
//!         for product in adapter.scrape("akıllı saat").await? {
//!             println!("{} {}", product.title, product.price);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extractors;
pub mod fetch;
pub mod product;
pub mod registry;
pub mod sites;

pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::extractors::rating::{RatingFallback, FALLBACK_RATING_MAX, FALLBACK_RATING_MIN};
pub use crate::fetch::{
    HttpFetcher, HttpFetcherBuilder, PageFetcher, PageRequest, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use crate::product::{Product, Site};
pub use crate::registry::ScraperRegistry;
pub use crate::sites::{
    Amazon, ExtractContext, ListingRules, ListingScraper, MediaMarkt, SiteAdapter, SitePolicy,
    Teknosa, Trendyol,
};
