// ABOUTME: Library entry point for the SmartyShop query service.
// ABOUTME: Re-exports ProductService, the result cache, clocks, settings and error types.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod service;

pub use crate::cache::{CacheEntry, CacheKey, ResultCache, CACHE_TTL_SECS};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{ConfigError, Settings};
pub use crate::error::ServiceError;
pub use crate::service::{ProductService, ServiceBuilder, DEFAULT_FALLBACK_SITE, TOP_N};
