use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Supported site languages.
///
/// Portuguese is the authoring language: every page is written in it and
/// every translation key is a Portuguese source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    En,
    Es,
    Fr,
}

impl Language {
    /// Every supported language, base language first
    pub const ALL: [Language; 4] = [Language::Pt, Language::En, Language::Es, Language::Fr];

    /// ISO 639-1 code (e.g. "pt", "en")
    pub fn code(self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }

    /// Parse a language code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    /// Whether this is the authoring language (never looked up, never prefixed)
    pub fn is_base(self) -> bool {
        self == Language::Pt
    }

    /// All languages that get a translated copy of the site
    pub fn targets() -> impl Iterator<Item = Language> {
        Language::ALL.into_iter().filter(|lang| !lang.is_base())
    }

    /// English name of the language
    pub fn name(self) -> &'static str {
        match self {
            Language::Pt => "Portuguese",
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
        }
    }

    /// Name of the language in itself
    pub fn native_name(self) -> &'static str {
        match self {
            Language::Pt => "Português",
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
        }
    }

    /// Text direction; all supported languages are left-to-right
    pub fn direction(self) -> &'static str {
        "ltr"
    }

    /// Country codes where the language is spoken
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            Language::Pt => &["BR", "PT"],
            Language::En => &["US", "GB", "AU", "CA"],
            Language::Es => &["ES", "MX", "AR", "CO"],
            Language::Fr => &["FR", "CA", "BE", "CH"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

/// Geographic regions used to derive formatting conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Br,
    Pt,
    Us,
    Gb,
    Global,
}

impl Region {
    pub fn code(self) -> &'static str {
        match self {
            Region::Br => "BR",
            Region::Pt => "PT",
            Region::Us => "US",
            Region::Gb => "GB",
            Region::Global => "GLOBAL",
        }
    }

    pub fn from_code(code: &str) -> Option<Region> {
        let code = code.trim();
        [Region::Br, Region::Pt, Region::Us, Region::Gb, Region::Global]
            .into_iter()
            .find(|region| region.code().eq_ignore_ascii_case(code))
    }

    /// Brazil and Portugal always get Portuguese and Lusophone formatting
    pub fn is_lusophone(self) -> bool {
        matches!(self, Region::Br | Region::Pt)
    }

    /// IANA timezone for the region
    pub fn timezone(self) -> &'static str {
        match self {
            Region::Br => "America/Sao_Paulo",
            Region::Pt => "Europe/Lisbon",
            Region::Us => "America/New_York",
            Region::Gb => "Europe/London",
            Region::Global => "UTC",
        }
    }

    /// ISO 4217 currency code
    pub fn currency(self) -> &'static str {
        match self {
            Region::Br => "BRL",
            _ => "USD",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolved locale for a request.
///
/// Everything except `language` and `region` is derived from the region
/// through fixed tables, so two configs built from the same pair are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleConfig {
    pub language: Language,
    pub region: Region,
    pub timezone: &'static str,
    pub currency: &'static str,
    /// strftime-style pattern
    pub date_format: &'static str,
    pub decimal_separator: &'static str,
    pub thousands_separator: &'static str,
}

impl LocaleConfig {
    /// Build the locale for a region/language pair
    pub fn for_region(region: Region, language: Language) -> Self {
        let lusophone = region.is_lusophone();
        Self {
            language,
            region,
            timezone: region.timezone(),
            currency: region.currency(),
            date_format: if lusophone { "%d/%m/%Y" } else { "%m/%d/%Y" },
            decimal_separator: if lusophone { "," } else { "." },
            thousands_separator: if lusophone { "." } else { "," },
        }
    }

    /// Locale code such as `pt_BR` or `en_GLOBAL`
    pub fn locale_code(&self) -> String {
        format!("{}_{}", self.language.code(), self.region.code())
    }

    pub fn should_use_portuguese(&self) -> bool {
        self.region.is_lusophone()
    }

    /// Render a date with this locale's date format
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.date_format).to_string()
    }
}

/// Complete site configuration (`lingo.toml`)
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteConfig {
    pub site: SiteLayout,
    pub translation: TranslationSettings,
    pub server: ServerSettings,
    pub geo: GeoSettings,
}

/// Where things live inside the site directory. All paths are relative.
#[derive(Debug, Clone, Serialize)]
pub struct SiteLayout {
    pub index: PathBuf,
    pub integrations_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub translated_dir: PathBuf,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            index: PathBuf::from("index.html"),
            integrations_dir: PathBuf::from("integracoes"),
            assets_dir: PathBuf::from("assets"),
            translated_dir: PathBuf::from("translated"),
        }
    }
}

/// Translation run settings
#[derive(Debug, Clone, Serialize)]
pub struct TranslationSettings {
    /// JSON translation table; the built-in table is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<PathBuf>,
    /// Languages produced by `translate`
    pub languages: Vec<Language>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            memory: None,
            languages: vec![Language::En],
        }
    }
}

/// Local i18n server settings
#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cache: CacheDurations,
    /// Bound for the geo detector cache; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_cache_capacity: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cache: CacheDurations::default(),
            geo_cache_capacity: None,
        }
    }
}

/// `Cache-Control` max-age per file type, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheDurations {
    pub html: u64,
    pub assets: u64,
    pub default: u64,
}

impl Default for CacheDurations {
    fn default() -> Self {
        Self {
            html: 3600,
            assets: 86400,
            default: 300,
        }
    }
}

impl CacheDurations {
    /// Pick the max-age for a served file path
    pub fn for_path(&self, path: &str) -> u64 {
        const ASSET_EXTENSIONS: &[&str] = &[".css", ".js", ".woff2", ".svg"];

        if path.ends_with(".html") {
            self.html
        } else if ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            self.assets
        } else {
            self.default
        }
    }
}

/// IP lookup rules for the development region table
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeoSettings {
    pub prefixes: Vec<PrefixRule>,
}

/// Requests whose IP starts with `prefix` are placed in `region`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub region: Region,
}
