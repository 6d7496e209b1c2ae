//! Crop name to image URL, with an ordered fallback chain.

use crate::catalog::{self, TERMINAL_GLYPH};
use crate::placeholder;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trimmed, lowercased crop name used for every lookup.
pub fn normalize_crop_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// What to display after an image failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageAttempt {
    Next(String),
    /// Nothing left to try; render the glyph inline
    Exhausted(char),
}

impl ImageAttempt {
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageAttempt::Next(url) => Some(url),
            ImageAttempt::Exhausted(_) => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ImageAttempt::Exhausted(_))
    }
}

/// Session-scoped resolver. The cache lives as long as the resolver.
#[derive(Debug, Default)]
pub struct CropImageResolver {
    cache: Mutex<HashMap<String, String>>,
}

impl CropImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// First image to show for a crop: cached URL, else the placeholder.
    pub fn resolve(&self, crop: &str) -> String {
        let key = normalize_crop_name(crop);
        let mut cache = self.cache.lock();
        if let Some(url) = cache.get(&key) {
            tracing::debug!(crop = %key, "Using cached image");
            return url.clone();
        }

        let url = placeholder::placeholder_url(&key);
        cache.insert(key, url.clone());
        url
    }

    /// Curated URLs followed by the placeholder. Never empty.
    pub fn fallbacks_for(&self, crop: &str) -> Vec<String> {
        let key = normalize_crop_name(crop);
        let mut urls: Vec<String> = catalog::curated_urls(&key)
            .iter()
            .map(|u| u.to_string())
            .collect();
        urls.push(placeholder::placeholder_url(&key));
        urls
    }

    /// Next candidate after attempt `failed_index` failed.
    ///
    /// Attempt 0 is the URL from [`resolve`](Self::resolve); attempt `k + 1`
    /// is `fallbacks_for(crop)[k]`.
    pub fn advance(&self, crop: &str, failed_index: usize) -> ImageAttempt {
        let fallbacks = self.fallbacks_for(crop);
        match fallbacks.into_iter().nth(failed_index) {
            Some(url) => ImageAttempt::Next(url),
            None => {
                tracing::warn!(crop, "All image sources failed");
                ImageAttempt::Exhausted(TERMINAL_GLYPH)
            }
        }
    }

    /// Resolve a batch of crops so later lookups hit the cache.
    pub fn preload<I, S>(&self, crops: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for crop in crops {
            self.resolve(crop.as_ref());
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        tracing::info!("Image cache cleared");
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Per-card resolution state: the candidate list and a forward-only cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct CropImageResolution {
    pub crop: String,
    initial: String,
    candidates: Vec<String>,
    cursor: usize,
}

impl CropImageResolution {
    pub fn new(resolver: &CropImageResolver, crop: &str) -> Self {
        Self {
            crop: crop.trim().to_string(),
            initial: resolver.resolve(crop),
            candidates: resolver.fallbacks_for(crop),
            cursor: 0,
        }
    }

    /// Index of the attempt currently displayed.
    pub fn attempt(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> ImageAttempt {
        if self.cursor == 0 {
            return ImageAttempt::Next(self.initial.clone());
        }
        match self.candidates.get(self.cursor - 1) {
            Some(url) => ImageAttempt::Next(url.clone()),
            None => ImageAttempt::Exhausted(TERMINAL_GLYPH),
        }
    }

    /// Record that `attempt` failed and return what to show now.
    ///
    /// Reports for an attempt older than the current one are ignored.
    pub fn report_failure(&mut self, attempt: usize) -> ImageAttempt {
        if attempt < self.cursor {
            tracing::debug!(crop = %self.crop, attempt, cursor = self.cursor, "Ignoring stale image failure");
            return self.current();
        }
        self.cursor = (attempt + 1).min(self.candidates.len() + 1);
        self.current()
    }

    pub fn is_terminal(&self) -> bool {
        self.cursor > self.candidates.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_normalization_shares_cache_entry() {
        let resolver = CropImageResolver::new();
        let a = resolver.resolve("Tomatoes");
        let b = resolver.resolve("  TOMATOES  ");
        assert_eq!(a, b);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_resolve_is_stable() {
        let resolver = CropImageResolver::new();
        assert_eq!(resolver.resolve("kale"), resolver.resolve("kale"));
    }

    #[test]
    fn test_fallbacks_end_with_data_url() {
        let resolver = CropImageResolver::new();
        for crop in ["tomatoes", "onion", "dragonfruit", ""] {
            let fallbacks = resolver.fallbacks_for(crop);
            assert!(!fallbacks.is_empty());
            assert!(fallbacks.last().unwrap().starts_with("data:"));
        }
        assert_eq!(resolver.fallbacks_for("dragonfruit").len(), 1);
    }

    #[test]
    fn test_advance_walks_fallbacks() {
        let resolver = CropImageResolver::new();
        let fallbacks = resolver.fallbacks_for("onions");
        assert_eq!(fallbacks.len(), 3);

        assert_eq!(resolver.advance("onions", 0), ImageAttempt::Next(fallbacks[0].clone()));
        assert_eq!(resolver.advance("onions", 2), ImageAttempt::Next(fallbacks[2].clone()));
        assert_eq!(resolver.advance("onions", 3), ImageAttempt::Exhausted('🌾'));
    }

    #[test]
    fn test_two_curated_urls_chain() {
        let resolver = CropImageResolver::new();
        let mut resolution = CropImageResolution::new(&resolver, "Onions");
        assert_eq!(resolution.current().url(), Some(resolver.resolve("onions").as_str()));

        let first = resolution.report_failure(0);
        assert!(first.url().unwrap().starts_with("https://cdn.pixabay.com"));
        let second = resolution.report_failure(1);
        assert!(second.url().unwrap().starts_with("https://images.unsplash.com"));
        let third = resolution.report_failure(2);
        assert!(third.url().unwrap().starts_with("data:image/svg+xml,"));
        let fourth = resolution.report_failure(3);
        assert_eq!(fourth, ImageAttempt::Exhausted('🌾'));
        assert!(resolution.is_terminal());
    }

    #[test]
    fn test_stale_failure_does_not_regress() {
        let resolver = CropImageResolver::new();
        let mut resolution = CropImageResolution::new(&resolver, "tomato");
        resolution.report_failure(0);
        resolution.report_failure(1);
        assert_eq!(resolution.attempt(), 2);

        let shown = resolution.report_failure(0);
        assert_eq!(resolution.attempt(), 2);
        assert_eq!(shown, resolution.current());
    }

    #[test]
    fn test_terminal_is_sticky() {
        let resolver = CropImageResolver::new();
        let mut resolution = CropImageResolution::new(&resolver, "dragonfruit");
        resolution.report_failure(0);
        assert!(!resolution.is_terminal());
        assert!(resolution.report_failure(1).is_exhausted());
        assert!(resolution.report_failure(40).is_exhausted());
        assert!(resolution.report_failure(1).is_exhausted());
    }

    #[test]
    fn test_clear_and_preload() {
        let resolver = CropImageResolver::new();
        resolver.preload(["wheat", "Rice", "  wheat"]);
        assert_eq!(resolver.cached_len(), 2);
        resolver.clear_cache();
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_attempt_serializes_tagged() {
        let json = serde_json::to_value(ImageAttempt::Exhausted('🌾')).unwrap();
        assert_eq!(json["kind"], "exhausted");
        assert_eq!(json["value"], "🌾");
    }
}
