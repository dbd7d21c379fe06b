// ABOUTME: Lookup table from site identifiers to site adapters.
// ABOUTME: builtin() wires the four shops against a shared fetcher and rating source.

use std::collections::HashMap;
use std::sync::Arc;

use crate::extractors::rating::RatingFallback;
use crate::fetch::PageFetcher;
use crate::product::Site;
use crate::sites::{Amazon, ListingScraper, MediaMarkt, SiteAdapter, Teknosa, Trendyol};

/// Site adapters keyed by lowercase site identifier.
#[derive(Default, Clone)]
pub struct ScraperRegistry {
    map: HashMap<String, Arc<dyn SiteAdapter>>,
}

impl ScraperRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every supported shop, sending `user_agent` on each request.
    pub fn builtin(
        fetcher: Arc<dyn PageFetcher>,
        fallback: Arc<RatingFallback>,
        user_agent: &str,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(
            Site::Amazon.id(),
            Arc::new(
                ListingScraper::new(Amazon, fetcher.clone(), fallback.clone())
                    .with_user_agent(user_agent),
            ),
        );
        registry.register(
            Site::Trendyol.id(),
            Arc::new(
                ListingScraper::new(Trendyol, fetcher.clone(), fallback.clone())
                    .with_user_agent(user_agent),
            ),
        );
        registry.register(
            Site::Teknosa.id(),
            Arc::new(
                ListingScraper::new(Teknosa, fetcher.clone(), fallback.clone())
                    .with_user_agent(user_agent),
            ),
        );
        registry.register(
            Site::MediaMarkt.id(),
            Arc::new(ListingScraper::new(MediaMarkt, fetcher, fallback).with_user_agent(user_agent)),
        );
        registry
    }

    /// Registers (or replaces) the adapter for `id`.
    pub fn register(&mut self, id: impl Into<String>, adapter: Arc<dyn SiteAdapter>) {
        self.map.insert(id.into(), adapter);
    }

    /// Looks up an adapter by exact identifier.
    pub fn get(&self, id: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.map.get(id).cloned()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.map.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered adapters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field("sites", &self.ids())
            .finish()
    }
}
