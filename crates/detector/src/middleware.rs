use crate::geo::GeoLocationDetector;
use lingo_kit_core::{Language, LocaleConfig};

/// Name of the cookie holding the visitor's explicit language choice
pub const LANGUAGE_COOKIE: &str = "language";

/// Default directory, relative to the site root, holding translated trees
pub const DEFAULT_TRANSLATED_DIR: &str = "translated";

/// Signals read from one request
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSignals<'a> {
    pub ip_address: &'a str,
    pub accept_language: Option<&'a str>,
    pub cloudflare_country: Option<&'a str>,
    pub cookie_language: Option<&'a str>,
}

/// Request-time language resolution and translated-path mapping
pub struct I18nMiddleware {
    detector: GeoLocationDetector,
    translated_dir: String,
}

impl I18nMiddleware {
    pub fn new(detector: GeoLocationDetector) -> Self {
        Self {
            detector,
            translated_dir: DEFAULT_TRANSLATED_DIR.to_string(),
        }
    }

    /// Use a different directory for translated trees
    pub fn with_translated_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        self.translated_dir = dir.trim_end_matches('/').to_string();
        self
    }

    pub fn detector(&self) -> &GeoLocationDetector {
        &self.detector
    }

    pub fn translated_dir(&self) -> &str {
        &self.translated_dir
    }

    /// Language to serve for a request.
    ///
    /// A recognized `language` cookie wins outright; anything else is
    /// resolved by the geo detector. Unrecognized cookie values are ignored.
    pub fn get_language_from_request(&self, signals: &RequestSignals<'_>) -> Language {
        if let Some(language) = signals.cookie_language.and_then(Language::from_code) {
            return language;
        }

        self.get_locale(signals).language
    }

    /// Full locale from the detector (the cookie does not take part)
    pub fn get_locale(&self, signals: &RequestSignals<'_>) -> LocaleConfig {
        self.detector.get_locale_config(
            signals.ip_address,
            signals.accept_language,
            signals.cloudflare_country,
        )
    }

    /// Site-relative path of `relative_path` in `language`.
    ///
    /// Portuguese maps to the path unchanged; other languages live under
    /// `<translated_dir>/<code>/`. Whether that file exists is the caller's
    /// concern.
    pub fn get_file_path(&self, language: Language, relative_path: &str) -> String {
        if language.is_base() {
            relative_path.to_string()
        } else {
            format!("{}/{}/{}", self.translated_dir, language.code(), relative_path)
        }
    }
}

impl Default for I18nMiddleware {
    fn default() -> Self {
        Self::new(GeoLocationDetector::new())
    }
}

/// Value of cookie `name` in a `Cookie` request header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}
