use crate::memory::TranslationMemory;
use lingo_kit_core::Language;
use serde::Serialize;

/// How complete a translation table is for each target language
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub total_keys: usize,
    pub languages: Vec<LanguageCoverage>,
}

/// Coverage of a single target language
#[derive(Debug, Clone, Serialize)]
pub struct LanguageCoverage {
    pub language: Language,
    pub translated: usize,
    /// Source strings without a translation, sorted
    pub missing: Vec<String>,
}

impl LanguageCoverage {
    /// Translated share in percent (100 for an empty table)
    pub fn percent(&self) -> f64 {
        let total = self.translated + self.missing.len();
        if total == 0 {
            return 100.0;
        }
        (self.translated as f64 / total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl CoverageReport {
    pub fn for_language(&self, language: Language) -> Option<&LanguageCoverage> {
        self.languages.iter().find(|c| c.language == language)
    }
}

impl TranslationMemory {
    /// Coverage for every non-Portuguese language
    pub fn coverage(&self) -> CoverageReport {
        let languages = Language::targets()
            .map(|language| {
                let mut missing: Vec<String> = self
                    .keys()
                    .filter(|key| !self.has_translation(key, language))
                    .map(str::to_string)
                    .collect();
                missing.sort();

                LanguageCoverage {
                    language,
                    translated: self.len() - missing.len(),
                    missing,
                }
            })
            .collect();

        CoverageReport {
            total_keys: self.len(),
            languages,
        }
    }
}
