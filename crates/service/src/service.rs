// ABOUTME: ProductService is the query surface: fetch-or-cache listings, top-N view and assistant questions.
// ABOUTME: Scrapes run outside every lock; concurrent misses may optionally share one fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use smartyshop_assistant::{AssistantClient, AssistantResponse};
use smartyshop_scrapers::{
    HttpFetcher, Product, RatingFallback, ScraperRegistry, SiteAdapter,
};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ResultCache};
use crate::config::{ConfigError, Settings};
use crate::error::ServiceError;

/// Size of the top-rated view.
pub const TOP_N: usize = 10;

/// Site scraped for the assistant when the caller supplies no products.
pub const DEFAULT_FALLBACK_SITE: &str = "trendyol";

type Gate = Arc<tokio::sync::Mutex<()>>;

pub struct ProductService {
    registry: ScraperRegistry,
    cache: Arc<ResultCache>,
    assistant: Option<AssistantClient>,
    fallback_site: String,
    coalesce_misses: bool,
    inflight: Mutex<HashMap<CacheKey, Gate>>,
}

/// Builder for [`ProductService`].
pub struct ServiceBuilder {
    registry: ScraperRegistry,
    cache: Option<Arc<ResultCache>>,
    assistant: Option<AssistantClient>,
    fallback_site: String,
    coalesce_misses: bool,
}

impl ServiceBuilder {
    pub fn new(registry: ScraperRegistry) -> Self {
        Self {
            registry,
            cache: None,
            assistant: None,
            fallback_site: DEFAULT_FALLBACK_SITE.to_string(),
            coalesce_misses: false,
        }
    }

    /// Share an existing cache, e.g. one driven by a manual clock.
    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable the assistant path.
    pub fn assistant(mut self, client: AssistantClient) -> Self {
        self.assistant = Some(client);
        self
    }

    /// Site scraped when `ask` receives no products.
    pub fn fallback_site(mut self, site: impl Into<String>) -> Self {
        self.fallback_site = site.into();
        self
    }

    /// Let concurrent misses for the same key wait for a single scrape.
    pub fn coalesce_misses(mut self, enabled: bool) -> Self {
        self.coalesce_misses = enabled;
        self
    }

    pub fn build(self) -> ProductService {
        ProductService {
            registry: self.registry,
            cache: self.cache.unwrap_or_default(),
            assistant: self.assistant,
            fallback_site: self.fallback_site,
            coalesce_misses: self.coalesce_misses,
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl ProductService {
    pub fn builder(registry: ScraperRegistry) -> ServiceBuilder {
        ServiceBuilder::new(registry)
    }

    /// Service wired to the real shops. The assistant is enabled only when a key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let fetcher: Arc<HttpFetcher> = Arc::new(settings.http_fetcher()?);
        let registry = ScraperRegistry::builtin(
            fetcher,
            Arc::new(RatingFallback::from_os()),
            &settings.user_agent,
        );
        let mut builder = Self::builder(registry);
        if settings.api_key.is_some() {
            builder = builder.assistant(settings.assistant_client()?);
        }
        Ok(builder.build())
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Known site identifiers, sorted.
    pub fn sites(&self) -> Vec<String> {
        self.registry.ids()
    }

    pub fn has_assistant(&self) -> bool {
        self.assistant.is_some()
    }

    /// Listings for `query` on `site`, from the cache while fresh, otherwise scraped and cached.
    pub async fn products(&self, site: &str, query: &str) -> Result<Vec<Product>, ServiceError> {
        require("site", site)?;
        require("query", query)?;
        let adapter = self
            .registry
            .get(site)
            .ok_or_else(|| ServiceError::invalid("invalid site"))?;

        if let Some(entry) = self.cache.get_fresh(site, query) {
            debug!(site, query, "cache hit");
            return Ok(entry.products.to_vec());
        }
        if !self.coalesce_misses {
            return self.scrape_and_store(adapter.as_ref(), site, query).await;
        }

        let slot = self.enter(CacheKey::new(site, query));
        let _turn = slot.gate.lock().await;
        match self.cache.get_fresh(site, query) {
            Some(entry) => {
                debug!(site, query, "cache filled while waiting");
                Ok(entry.products.to_vec())
            }
            None => self.scrape_and_store(adapter.as_ref(), site, query).await,
        }
    }

    /// Up to `n` best-rated listings of a fresh cache entry. Never scrapes.
    pub fn top(&self, site: &str, query: &str, n: usize) -> Result<Vec<Product>, ServiceError> {
        require("site", site)?;
        require("query", query)?;
        self.cache
            .fresh_top(site, query, n)
            .ok_or_else(|| ServiceError::NotCached {
                site: site.to_string(),
                query: query.to_string(),
            })
    }

    /// Asks the assistant about `products`, scraping the fallback site when none are given.
    pub async fn ask(
        &self,
        question: &str,
        products: Vec<Product>,
    ) -> Result<AssistantResponse, ServiceError> {
        require("question", question)?;
        let assistant = self
            .assistant
            .as_ref()
            .ok_or(ServiceError::AssistantUnavailable)?;

        let products = if products.is_empty() {
            self.fallback_products(question).await
        } else {
            products
        };
        Ok(assistant.insights(&products, question).await?)
    }

    async fn fallback_products(&self, question: &str) -> Vec<Product> {
        let Some(adapter) = self.registry.get(&self.fallback_site) else {
            warn!(site = %self.fallback_site, "fallback site is not registered");
            return vec![];
        };
        match adapter.scrape(question).await {
            Ok(products) => products,
            Err(err) => {
                warn!(site = %self.fallback_site, error = %err, "fallback scrape failed, asking without products");
                vec![]
            }
        }
    }

    async fn scrape_and_store(
        &self,
        adapter: &dyn SiteAdapter,
        site: &str,
        query: &str,
    ) -> Result<Vec<Product>, ServiceError> {
        let products = adapter
            .scrape(query)
            .await
            .map_err(|source| ServiceError::ScrapeFailed {
                site: site.to_string(),
                source,
            })?;
        info!(site, query, count = products.len(), "scraped");
        let entry = self.cache.put(site, query, products);
        Ok(entry.products.to_vec())
    }

    fn enter(&self, key: CacheKey) -> InflightSlot<'_> {
        let gate = {
            let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            inflight.entry(key.clone()).or_default().clone()
        };
        InflightSlot {
            inflight: &self.inflight,
            key,
            gate,
        }
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.lock().unwrap().len()
    }
}

/// A caller's share of a key's gate. Dropping it, finished or cancelled,
/// removes the map entry once nobody else holds the gate.
struct InflightSlot<'a> {
    inflight: &'a Mutex<HashMap<CacheKey, Gate>>,
    key: CacheKey,
    gate: Gate,
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        // Map plus this handle.
        if Arc::strong_count(&self.gate) == 2 {
            inflight.remove(&self.key);
        }
    }
}

impl std::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductService")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .field("assistant", &self.assistant)
            .field("fallback_site", &self.fallback_site)
            .field("coalesce_misses", &self.coalesce_misses)
            .finish()
    }
}

fn require(name: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::invalid(format!("'{name}' is required")))
    } else {
        Ok(())
    }
}
