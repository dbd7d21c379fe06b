// ABOUTME: The SiteAdapter capability and the generic listing scraper that drives per-site rules.
// ABOUTME: One fetch per scrape; transport errors abort, per-listing problems are absorbed.

//! Site adapters.
//!
//! Every shop is a [`ListingRules`] value describing where its listings live
//! and how to read one listing. [`ListingScraper`] pairs those rules with a
//! [`PageFetcher`] and implements the single-method [`SiteAdapter`] capability
//! that the registry hands out.

pub mod amazon;
pub mod mediamarkt;
pub mod teknosa;
pub mod trendyol;

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::extractors::compiled::get_or_compile;
use crate::extractors::normalize::fold_query;
use crate::extractors::rating::RatingFallback;
use crate::fetch::{PageFetcher, PageRequest, DEFAULT_USER_AGENT};
use crate::product::{Product, Site};

pub use amazon::Amazon;
pub use mediamarkt::MediaMarkt;
pub use teknosa::Teknosa;
pub use trendyol::Trendyol;

/// Scrapes the first results page of one shop for a query.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    async fn scrape(&self, query: &str) -> Result<Vec<Product>, ScrapeError>;
}

/// Per-site tolerance for incomplete listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitePolicy {
    /// Drop listings whose required fields (title, url) are empty.
    pub skip_incomplete: bool,
    /// Replace a missing or zero rating with a synthesized one.
    pub synthesize_rating: bool,
}

/// Where a shop's listings live and how to read one of them.
pub trait ListingRules: Send + Sync {
    fn site(&self) -> Site;

    fn policy(&self) -> SitePolicy;

    /// Search URL for an already folded query.
    fn search_url(&self, base: &str, query: &str) -> String;

    /// Selector matching one listing fragment.
    fn fragment_selector(&self) -> &'static str;

    /// Reads one fragment. `None` means the fragment was skipped.
    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<Product>;
}

/// Shared state handed to [`ListingRules::extract`].
pub struct ExtractContext<'a> {
    pub site: Site,
    pub policy: SitePolicy,
    pub base_url: &'a Url,
    pub fallback: &'a RatingFallback,
}

impl ExtractContext<'_> {
    /// Applies the skip policy to a required field.
    ///
    /// Returns `None` when the field is empty and the site skips incomplete
    /// listings; otherwise the value, or an empty string.
    pub fn required(&self, value: Option<String>, field: &str) -> Option<String> {
        match value {
            Some(v) => Some(v),
            None if self.policy.skip_incomplete => {
                debug!(site = %self.site, field, "listing without required field skipped");
                None
            }
            None => Some(String::new()),
        }
    }

    /// Resolves a site-relative link against the site origin. Empty stays empty.
    pub fn resolve(&self, href: &str) -> String {
        if href.is_empty() {
            return String::new();
        }
        self.base_url
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string())
    }

    /// Final rating for a listing, synthesizing one when the policy asks for it.
    pub fn rating(&self, parsed: Option<f64>) -> f64 {
        let rating = parsed.unwrap_or(0.0);
        if rating == 0.0 && self.policy.synthesize_rating {
            let synthesized = self.fallback.draw();
            debug!(site = %self.site, rating = synthesized, "rating synthesized");
            synthesized
        } else {
            rating
        }
    }

    /// Starts a product tagged with this site.
    pub fn product(&self) -> Product {
        Product {
            site: self.site.id().to_string(),
            ..Default::default()
        }
    }
}

/// A [`SiteAdapter`] built from [`ListingRules`] and a [`PageFetcher`].
pub struct ListingScraper<R> {
    rules: R,
    policy: SitePolicy,
    fetcher: Arc<dyn PageFetcher>,
    fallback: Arc<RatingFallback>,
    base_url: Url,
    user_agent: String,
}

impl<R: ListingRules> ListingScraper<R> {
    /// Scraper against the site's real origin.
    pub fn new(rules: R, fetcher: Arc<dyn PageFetcher>, fallback: Arc<RatingFallback>) -> Self {
        let policy = rules.policy();
        let base_url = Url::parse(rules.site().origin()).expect("site origins are valid URLs");
        Self {
            rules,
            policy,
            fetcher,
            fallback,
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Points the scraper at another origin, e.g. a mirror or a local test server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Overrides the per-site skip/synthesize policy.
    pub fn with_policy(mut self, policy: SitePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the user agent sent with the page request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn site(&self) -> Site {
        self.rules.site()
    }

    pub fn policy(&self) -> SitePolicy {
        self.policy
    }

    /// Builds the outbound request for a raw user query.
    pub fn page_request(&self, query: &str) -> PageRequest {
        let folded = fold_query(query);
        let encoded = urlencoding::encode(&folded);
        let base = self.base_url.as_str().trim_end_matches('/');
        PageRequest {
            url: self.rules.search_url(base, &encoded),
            user_agent: self.user_agent.clone(),
            allowed_domains: self
                .base_url
                .host_str()
                .map(|h| vec![h.to_string()])
                .unwrap_or_default(),
        }
    }

    /// Extracts every listing from a results page.
    pub fn extract_page(&self, html: &str) -> Vec<Product> {
        let doc = Html::parse_document(html);
        let Some(selector) = get_or_compile(self.rules.fragment_selector()) else {
            return vec![];
        };
        let ctx = ExtractContext {
            site: self.rules.site(),
            policy: self.policy,
            base_url: &self.base_url,
            fallback: &self.fallback,
        };
        doc.select(&selector)
            .filter_map(|fragment| self.rules.extract(fragment, &ctx))
            .collect()
    }
}

#[async_trait]
impl<R: ListingRules> SiteAdapter for ListingScraper<R> {
    async fn scrape(&self, query: &str) -> Result<Vec<Product>, ScrapeError> {
        let request = self.page_request(query);
        info!(site = %self.rules.site(), url = %request.url, "visiting");
        let html = self.fetcher.fetch(&request).await?;
        let products = self.extract_page(&html);
        info!(site = %self.rules.site(), count = products.len(), "listings extracted");
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFetch;

    #[async_trait]
    impl PageFetcher for NoFetch {
        async fn fetch(&self, request: &PageRequest) -> Result<String, ScrapeError> {
            Err(ScrapeError::fetch(&request.url, "Fetch", None))
        }
    }

    fn scraper<R: ListingRules>(rules: R) -> ListingScraper<R> {
        ListingScraper::new(rules, Arc::new(NoFetch), Arc::new(RatingFallback::seeded(1)))
    }

    #[test]
    fn page_request_folds_and_encodes_query() {
        let request = scraper(Trendyol).page_request("akıllı saat");
        assert_eq!(request.url, "https://www.trendyol.com/sr?q=akilli%20saat");
        assert_eq!(request.allowed_domains, vec!["www.trendyol.com"]);
        assert_eq!(request.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn search_urls_per_site() {
        assert_eq!(
            scraper(Amazon).page_request("kulaklık").url,
            "https://www.amazon.com.tr/s?k=kulaklik"
        );
        assert_eq!(
            scraper(Teknosa).page_request("tv").url,
            "https://www.teknosa.com/arama/?sort=mostFavorited-desc&s=tv%3Arelevance"
        );
        assert_eq!(
            scraper(MediaMarkt).page_request("süpürge").url,
            "https://www.mediamarkt.com.tr/tr/search.html?query=supurge"
        );
    }

    #[test]
    fn base_url_override_changes_host_and_allow_list() {
        let request = scraper(Trendyol)
            .with_base_url(Url::parse("http://127.0.0.1:8080").unwrap())
            .page_request("x");
        assert_eq!(request.url, "http://127.0.0.1:8080/sr?q=x");
        assert_eq!(request.allowed_domains, vec!["127.0.0.1"]);
    }

    #[tokio::test]
    async fn transport_error_aborts_scrape() {
        let err = scraper(Trendyol)
            .scrape("phone")
            .await
            .expect_err("fetch failure must surface");
        assert!(err.is_fetch());
    }

    #[test]
    fn required_respects_policy() {
        let base = Url::parse("https://www.teknosa.com").unwrap();
        let fallback = RatingFallback::seeded(3);
        let strict = ExtractContext {
            site: Site::Teknosa,
            policy: SitePolicy {
                skip_incomplete: true,
                synthesize_rating: false,
            },
            base_url: &base,
            fallback: &fallback,
        };
        assert_eq!(strict.required(None, "title"), None);
        assert_eq!(strict.rating(None), 0.0);

        let lenient = ExtractContext {
            policy: SitePolicy {
                skip_incomplete: false,
                synthesize_rating: true,
            },
            ..strict
        };
        assert_eq!(lenient.required(None, "title"), Some(String::new()));
        let r = lenient.rating(Some(0.0));
        assert!((3.5..=4.9).contains(&r));
        assert_eq!(lenient.rating(Some(4.2)), 4.2);
    }

    #[test]
    fn resolve_handles_relative_absolute_and_empty() {
        let base = Url::parse("https://www.mediamarkt.com.tr").unwrap();
        let fallback = RatingFallback::seeded(3);
        let ctx = ExtractContext {
            site: Site::MediaMarkt,
            policy: MediaMarkt.policy(),
            base_url: &base,
            fallback: &fallback,
        };
        assert_eq!(
            ctx.resolve("/tr/product/_x-1.html"),
            "https://www.mediamarkt.com.tr/tr/product/_x-1.html"
        );
        assert_eq!(ctx.resolve("https://cdn.test/a"), "https://cdn.test/a");
        assert_eq!(ctx.resolve(""), "");
    }
}
