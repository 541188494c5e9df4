use lingo_kit_core::{Error, Language, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Translation table shipped with the binary
const BUILTIN_TABLE: &str = include_str!("../data/translations.json");

/// Exact-match translation memory.
///
/// Keys are Portuguese source strings taken verbatim from the pages
/// (case, whitespace, emoji and punctuation all matter). Each key maps to
/// the strings available for the other languages. The table is read-only
/// once built; callers share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TranslationMemory {
    entries: HashMap<String, HashMap<Language, String>>,
}

impl TranslationMemory {
    /// Create an empty memory (every lookup falls back to the source text)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table for the site's navigation and landing page strings
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    /// Raw JSON of the built-in table, used to scaffold new sites
    pub fn builtin_json() -> &'static str {
        BUILTIN_TABLE
    }

    /// Load a table from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let memory = Self::from_json_str(&content)?;
        debug!(
            "Loaded {} translation entries from {}",
            memory.len(),
            path.display()
        );
        Ok(memory)
    }

    /// Parse a table of the form `{ "<pt source>": { "<lang>": "<text>" } }`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(json)?;

        let mut memory = Self::new();
        for (source, translations) in raw {
            for (code, text) in translations {
                let language = Language::from_code(&code).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "Unknown language '{}' for translation key '{}'",
                        code, source
                    ))
                })?;
                memory = memory.with_entry(source.clone(), language, text);
            }
        }
        Ok(memory)
    }

    /// Add one translation (builder style)
    pub fn with_entry(
        mut self,
        source: impl Into<String>,
        language: Language,
        text: impl Into<String>,
    ) -> Self {
        self.entries
            .entry(source.into())
            .or_default()
            .insert(language, text.into());
        self
    }

    /// Translate `text` into `language`.
    ///
    /// Portuguese is returned untouched. Unknown keys, and keys without a
    /// string for the requested language, also return `text` unchanged.
    pub fn translate<'a>(&'a self, text: &'a str, language: Language) -> &'a str {
        if language.is_base() {
            return text;
        }

        self.entries
            .get(text)
            .and_then(|translations| translations.get(&language))
            .map(String::as_str)
            .unwrap_or(text)
    }

    /// Whether the table has an entry for this exact source string
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// Number of source strings in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source strings in the table (unordered)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether `source` has a string for `language`
    pub(crate) fn has_translation(&self, source: &str, language: Language) -> bool {
        self.entries
            .get(source)
            .is_some_and(|translations| translations.contains_key(&language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_memory() -> TranslationMemory {
        TranslationMemory::new()
            .with_entry("Salvar", Language::En, "Save")
            .with_entry("Salvar", Language::Es, "Guardar")
            .with_entry("Cancelar", Language::En, "Cancel")
    }

    #[test]
    fn test_translate_known_key() {
        let memory = sample_memory();
        assert_eq!(memory.translate("Salvar", Language::En), "Save");
        assert_eq!(memory.translate("Salvar", Language::Es), "Guardar");
    }

    #[test]
    fn test_translate_portuguese_is_identity() {
        let memory = sample_memory();
        assert_eq!(memory.translate("Salvar", Language::Pt), "Salvar");
    }

    #[test]
    fn test_translate_missing_language_falls_back_to_source() {
        let memory = sample_memory();
        assert_eq!(memory.translate("Cancelar", Language::Fr), "Cancelar");
    }

    #[test]
    fn test_translate_is_exact_match() {
        let memory = sample_memory();
        assert_eq!(memory.translate("salvar", Language::En), "salvar");
        assert_eq!(memory.translate(" Salvar", Language::En), " Salvar");
        assert_eq!(memory.translate("Salvar ", Language::En), "Salvar ");
    }

    #[test]
    fn test_builtin_table_parses() {
        let memory = TranslationMemory::builtin().unwrap();
        assert!(!memory.is_empty());
        assert_eq!(
            memory.translate("AI Factory | Automação e Templates com IA", Language::En),
            "AI Factory | Automation and Templates with AI"
        );
        assert_eq!(memory.translate("🏭 Gerador", Language::En), "🏭 Generator");
        assert_eq!(
            memory.translate("Cole sua chave aqui...", Language::En),
            "Paste your key here..."
        );
    }

    #[test]
    fn test_from_json_rejects_unknown_language() {
        let result = TranslationMemory::from_json_str(r#"{"Salvar": {"de": "Speichern"}}"#);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("'de'"));
        assert!(message.contains("Salvar"));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        assert!(TranslationMemory::from_json_str("[1, 2, 3]").is_err());
        assert!(TranslationMemory::from_json_str("{").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = TranslationMemory::load(dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("translations.json");
        fs::write(&path, r#"{"Comece Agora": {"en": "Get Started", "fr": "Commencer"}}"#)
            .unwrap();

        let memory = TranslationMemory::load(&path).unwrap();
        assert_eq!(memory.len(), 1);
        assert!(memory.contains("Comece Agora"));
        assert_eq!(memory.translate("Comece Agora", Language::Fr), "Commencer");
    }

    proptest! {
        #[test]
        fn prop_portuguese_identity(text in ".*") {
            let memory = TranslationMemory::builtin().unwrap();
            prop_assert_eq!(memory.translate(&text, Language::Pt), text.as_str());
        }

        #[test]
        fn prop_unknown_text_is_returned_unchanged(text in "[a-z0-9 ]{0,40}") {
            let memory = sample_memory();
            prop_assume!(!memory.contains(&text));
            for language in Language::ALL {
                prop_assert_eq!(memory.translate(&text, language), text.as_str());
            }
        }
    }
}
