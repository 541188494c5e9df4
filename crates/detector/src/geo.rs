//! Locale resolution from request signals.
//!
//! Region comes from the CDN country header, then the IP lookup, then
//! `GLOBAL`. Language comes from the CDN country when the header is present,
//! otherwise `Accept-Language`, then Portuguese. Brazil and Portugal always get Portuguese. Results are
//! memoized by the exact input tuple.

use crate::accept_language::parse_accept_language;
use crate::cloudflare::{language_for_country, normalize_country, region_for_country};
use crate::lookup::{PrefixTable, RegionLookup};
use lingo_kit_core::{GeoSettings, Language, LocaleConfig, Region};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

type CacheKey = (String, Option<String>, Option<String>);

/// How resolved locales are memoized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep every resolution for the life of the process
    Unbounded,
    /// Keep at most this many resolutions, evicting the least recently used
    Lru(NonZeroUsize),
}

impl CachePolicy {
    /// `None` (or zero) means unbounded
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        match capacity.and_then(NonZeroUsize::new) {
            Some(capacity) => CachePolicy::Lru(capacity),
            None => CachePolicy::Unbounded,
        }
    }
}

enum LocaleCache {
    Unbounded(HashMap<CacheKey, LocaleConfig>),
    Lru(LruCache<CacheKey, LocaleConfig>),
}

impl LocaleCache {
    fn new(policy: CachePolicy) -> Self {
        match policy {
            CachePolicy::Unbounded => LocaleCache::Unbounded(HashMap::new()),
            CachePolicy::Lru(capacity) => LocaleCache::Lru(LruCache::new(capacity)),
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<LocaleConfig> {
        match self {
            LocaleCache::Unbounded(map) => map.get(key).cloned(),
            LocaleCache::Lru(cache) => cache.get(key).cloned(),
        }
    }

    fn insert(&mut self, key: CacheKey, locale: LocaleConfig) {
        match self {
            LocaleCache::Unbounded(map) => {
                map.insert(key, locale);
            }
            LocaleCache::Lru(cache) => {
                cache.put(key, locale);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            LocaleCache::Unbounded(map) => map.len(),
            LocaleCache::Lru(cache) => cache.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            LocaleCache::Unbounded(map) => map.clear(),
            LocaleCache::Lru(cache) => cache.clear(),
        }
    }
}

/// Snapshot of the detector cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Resolves a [`LocaleConfig`] from the IP address and request headers.
///
/// Resolution never fails. Missing or unrecognized signals fall through to
/// the `GLOBAL` region and Portuguese.
pub struct GeoLocationDetector {
    lookup: Box<dyn RegionLookup>,
    policy: CachePolicy,
    cache: Mutex<LocaleCache>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for GeoLocationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoLocationDetector {
    /// Development prefix table with an unbounded cache
    pub fn new() -> Self {
        Self::with_lookup(PrefixTable::development(), CachePolicy::Unbounded)
    }

    pub fn with_lookup(lookup: impl RegionLookup + 'static, policy: CachePolicy) -> Self {
        Self {
            lookup: Box::new(lookup),
            policy,
            cache: Mutex::new(LocaleCache::new(policy)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Build from `[[geo.prefix]]` rules and the configured cache bound
    pub fn from_settings(geo: &GeoSettings, cache_capacity: Option<usize>) -> Self {
        Self::with_lookup(
            PrefixTable::from_rules(&geo.prefixes),
            CachePolicy::from_capacity(cache_capacity),
        )
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    /// Resolve the locale for a request, consulting the cache first
    pub fn get_locale_config(
        &self,
        ip_address: &str,
        accept_language: Option<&str>,
        cloudflare_country: Option<&str>,
    ) -> LocaleConfig {
        let key: CacheKey = (
            ip_address.to_string(),
            accept_language.map(str::to_string),
            cloudflare_country.map(str::to_string),
        );

        if let Some(locale) = self.cache().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Locale cache hit for {}: {}", ip_address, locale.locale_code());
            return locale;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let locale = self.resolve(ip_address, accept_language, cloudflare_country);
        debug!(
            "Resolved {} for ip={} accept-language={:?} cf-country={:?}",
            locale.locale_code(),
            ip_address,
            accept_language,
            cloudflare_country
        );
        self.cache().insert(key, locale.clone());
        locale
    }

    /// Resolve without touching the cache
    pub fn resolve(
        &self,
        ip_address: &str,
        accept_language: Option<&str>,
        cloudflare_country: Option<&str>,
    ) -> LocaleConfig {
        let country = cloudflare_country.and_then(normalize_country);

        let region = self.detect_region(ip_address, country.as_deref());
        let language = if region.is_lusophone() {
            Language::Pt
        } else {
            detect_language(accept_language, country.as_deref())
        };

        LocaleConfig::for_region(region, language)
    }

    fn detect_region(&self, ip_address: &str, country: Option<&str>) -> Region {
        match country {
            Some(country) => region_for_country(country),
            None => self
                .lookup
                .lookup(ip_address)
                .unwrap_or(Region::Global),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache().len(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, LocaleCache> {
        // The cache only memoizes a pure function, so a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Language from header signals alone: CDN country, then `Accept-Language`,
/// then Portuguese.
///
/// `country` must already be normalized. A present country always decides,
/// so an unlisted one yields Portuguese without consulting `Accept-Language`.
pub fn detect_language(accept_language: Option<&str>, country: Option<&str>) -> Language {
    match country {
        Some(country) => language_for_country(country),
        None => accept_language
            .and_then(parse_accept_language)
            .unwrap_or(Language::Pt),
    }
}
