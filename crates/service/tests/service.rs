// ABOUTME: End-to-end tests of ProductService over fake adapters, a manual clock and a mock assistant.
// ABOUTME: Covers the fetch-then-top flow, expiry, cache isolation and the assistant fallback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeDelta;
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use smartyshop_assistant::AssistantClient;
use smartyshop_scrapers::{Product, ScrapeError, ScraperRegistry, SiteAdapter};
use smartyshop_service::{ManualClock, ProductService, ResultCache, ServiceError, TOP_N};

/// Returns a fixed listing and records the queries it was asked for.
struct FakeSite {
    products: Vec<Product>,
    queries: Mutex<Vec<String>>,
}

impl FakeSite {
    fn new(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            products,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SiteAdapter for FakeSite {
    async fn scrape(&self, query: &str) -> Result<Vec<Product>, ScrapeError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.products.clone())
    }
}

/// Always fails like an unreachable shop.
struct DownSite {
    calls: AtomicUsize,
}

#[async_trait]
impl SiteAdapter for DownSite {
    async fn scrape(&self, query: &str) -> Result<Vec<Product>, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScrapeError::timeout(
            format!("https://www.trendyol.com/sr?q={query}"),
            "Fetch",
            None,
        ))
    }
}

fn listing(n: usize) -> Vec<Product> {
    (0..n)
        .map(|i| Product {
            title: format!("item {i}"),
            rating: (i % 7) as f64 * 0.5,
            site: "trendyol".to_string(),
            ..Default::default()
        })
        .collect()
}

struct Harness {
    clock: Arc<ManualClock>,
    trendyol: Arc<FakeSite>,
    amazon: Arc<FakeSite>,
    service: ProductService,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::default());
    let trendyol = FakeSite::new(listing(14));
    let amazon = FakeSite::new(listing(3));
    let mut registry = ScraperRegistry::new();
    registry.register("trendyol", trendyol.clone());
    registry.register("amazon", amazon.clone());
    let service = ProductService::builder(registry)
        .cache(Arc::new(ResultCache::with_clock(clock.clone())))
        .build();
    Harness {
        clock,
        trendyol,
        amazon,
        service,
    }
}

#[tokio::test]
async fn top_before_fetch_is_not_cached_then_sorted_after() {
    let h = harness();

    let err = h.service.top("trendyol", "saat", TOP_N).unwrap_err();
    assert!(matches!(err, ServiceError::NotCached { .. }));
    assert!(err.is_client_error());

    let all = h.service.products("trendyol", "saat").await.unwrap();
    assert_eq!(all.len(), 14);

    let top = h.service.top("trendyol", "saat", TOP_N).unwrap();
    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));
    assert_eq!(top[0].rating, 3.0);
    // Equal ratings keep scrape order.
    assert_eq!(top[0].title, "item 6");
    assert_eq!(top[1].title, "item 13");
}

#[tokio::test]
async fn fresh_entry_is_served_without_scraping() {
    let h = harness();
    let first = h.service.products("trendyol", "saat").await.unwrap();
    h.clock.advance(TimeDelta::seconds(9));
    let second = h.service.products("trendyol", "saat").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.trendyol.calls(), 1);
}

#[tokio::test]
async fn expired_entry_is_refetched() {
    let h = harness();
    h.service.products("trendyol", "saat").await.unwrap();
    h.clock.advance(TimeDelta::seconds(10));

    assert!(matches!(
        h.service.top("trendyol", "saat", TOP_N),
        Err(ServiceError::NotCached { .. })
    ));
    h.service.products("trendyol", "saat").await.unwrap();
    assert_eq!(h.trendyol.calls(), 2);
    assert!(h.service.top("trendyol", "saat", TOP_N).is_ok());
}

#[tokio::test]
async fn cache_keys_do_not_leak_between_sites_or_queries() {
    let h = harness();
    h.service.products("trendyol", "saat").await.unwrap();

    assert!(h.service.top("amazon", "saat", TOP_N).is_err());
    assert!(h.service.top("trendyol", "kulaklık", TOP_N).is_err());

    let amazon = h.service.products("amazon", "saat").await.unwrap();
    assert_eq!(amazon.len(), 3);
    assert_eq!(h.amazon.calls(), 1);
    assert_eq!(h.service.cache().len(), 2);
}

#[tokio::test]
async fn unknown_site_is_rejected() {
    let h = harness();
    let err = h.service.products("hepsiburada", "saat").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput { .. }));
    assert!(h.service.cache().is_empty());
}

#[tokio::test]
async fn scrape_failure_surfaces_and_caches_nothing() {
    let mut registry = ScraperRegistry::new();
    registry.register(
        "trendyol",
        Arc::new(DownSite {
            calls: AtomicUsize::new(0),
        }),
    );
    let service = ProductService::builder(registry).build();

    let err = service.products("trendyol", "saat").await.unwrap_err();
    match &err {
        ServiceError::ScrapeFailed { site, source } => {
            assert_eq!(site, "trendyol");
            assert!(source.is_timeout());
        }
        other => panic!("expected ScrapeFailed, got {other:?}"),
    }
    assert!(!err.is_client_error());
    assert!(service.cache().is_empty());
}

fn assistant(server: &MockServer) -> AssistantClient {
    AssistantClient::builder()
        .api_key("test-key")
        .endpoint(server.base_url())
        .build()
        .unwrap()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

#[tokio::test]
async fn ask_uses_supplied_products_without_scraping() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-pro:generateContent")
            .body_includes("- Title: Supplied watch");
        then.status(200)
            .json_body(gemini_reply(r#"{"answer":"Take it.","products":[]}"#));
    });

    let trendyol = FakeSite::new(listing(2));
    let mut registry = ScraperRegistry::new();
    registry.register("trendyol", trendyol.clone());
    let service = ProductService::builder(registry)
        .assistant(assistant(&server))
        .build();

    let supplied = vec![Product {
        title: "Supplied watch".to_string(),
        ..Default::default()
    }];
    let reply = service.ask("Is this good?", supplied).await.unwrap();
    mock.assert();
    assert_eq!(reply.answer, "Take it.");
    assert_eq!(trendyol.calls(), 0);
}

#[tokio::test]
async fn ask_without_products_scrapes_fallback_site() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).body_includes("- Title: item 1");
        then.status(200)
            .json_body(gemini_reply(r#"{"answer":"From trendyol."}"#));
    });

    let trendyol = FakeSite::new(listing(2));
    let mut registry = ScraperRegistry::new();
    registry.register("trendyol", trendyol.clone());
    let service = ProductService::builder(registry)
        .assistant(assistant(&server))
        .build();

    let reply = service.ask("akıllı saat önerir misin?", vec![]).await.unwrap();
    mock.assert();
    assert_eq!(reply.answer, "From trendyol.");
    assert_eq!(
        *trendyol.queries.lock().unwrap(),
        vec!["akıllı saat önerir misin?".to_string()]
    );
}

#[tokio::test]
async fn fallback_failure_still_asks_with_empty_list() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).body_includes("Products:\\n\"");
        then.status(200)
            .json_body(gemini_reply(r#"{"answer":"General advice.","products":[]}"#));
    });

    let down = Arc::new(DownSite {
        calls: AtomicUsize::new(0),
    });
    let mut registry = ScraperRegistry::new();
    registry.register("trendyol", down.clone());
    let service = ProductService::builder(registry)
        .assistant(assistant(&server))
        .build();

    let reply = service.ask("best budget phone?", vec![]).await.unwrap();
    mock.assert();
    assert_eq!(reply.answer, "General advice.");
    assert_eq!(down.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn assistant_schema_failure_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(gemini_reply("Sorry, I cannot help."));
    });

    let mut registry = ScraperRegistry::new();
    registry.register("trendyol", FakeSite::new(vec![]));
    let service = ProductService::builder(registry)
        .assistant(assistant(&server))
        .build();

    let err = service.ask("q", listing(1)).await.unwrap_err();
    match err {
        ServiceError::Assistant(inner) => {
            assert_eq!(inner.raw_reply(), Some("Sorry, I cannot help."))
        }
        other => panic!("expected Assistant error, got {other:?}"),
    }
}
