//! Request locale detection.
//!
//! [`GeoLocationDetector`] turns an IP address and request headers into a
//! [`LocaleConfig`](lingo_kit_core::LocaleConfig); [`I18nMiddleware`] adds the
//! language cookie on top and maps pages to their translated paths.

pub mod accept_language;
pub mod cloudflare;
pub mod geo;
pub mod lookup;
pub mod middleware;

pub use accept_language::parse_accept_language;
pub use geo::{CachePolicy, CacheStats, GeoLocationDetector, detect_language};
pub use lookup::{PrefixTable, RegionLookup};
pub use middleware::{
    DEFAULT_TRANSLATED_DIR, I18nMiddleware, LANGUAGE_COOKIE, RequestSignals, cookie_value,
};
