use crate::stats::TranslationStats;
use chrono::{DateTime, Utc};
use lingo_kit_core::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the manifest inside the translated directory
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Manifest format version
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Snapshot of the available languages and the last generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationManifest {
    pub generated: DateTime<Utc>,
    pub version: String,
    /// Keyed by language code
    pub languages: BTreeMap<String, LanguageInfo>,
    pub statistics: TranslationStats,
}

impl TranslationManifest {
    pub fn new(statistics: TranslationStats) -> Self {
        Self {
            generated: Utc::now(),
            version: MANIFEST_VERSION.to_string(),
            languages: language_catalog(),
            statistics,
        }
    }
}

/// Catalog entry for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub native_name: String,
    pub direction: String,
    pub regions: Vec<String>,
}

impl LanguageInfo {
    pub fn for_language(language: Language) -> Self {
        Self {
            name: language.name().to_string(),
            native_name: language.native_name().to_string(),
            direction: language.direction().to_string(),
            regions: language.regions().iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Every supported language keyed by code
pub fn language_catalog() -> BTreeMap<String, LanguageInfo> {
    Language::ALL
        .into_iter()
        .map(|language| (language.code().to_string(), LanguageInfo::for_language(language)))
        .collect()
}
