pub mod init;
pub mod locale;
pub mod serve;
pub mod template;
pub mod translate;
pub mod validate;

use anyhow::{Context, Result};
use lingo_kit_core::{Language, SiteConfig, load_site_config};
use lingo_kit_generator::{TranslationGenerator, TranslationStats};
use lingo_kit_translator::{HtmlTranslator, TranslationMemory};
use std::path::Path;
use std::sync::Arc;

/// Fail with a hint unless `path` is an existing directory
pub(crate) fn ensure_site_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'lingo-kit init {}' first",
            path.display(),
            path.display()
        );
    }
    Ok(())
}

/// `lingo.toml` from the site directory, or defaults when absent
pub(crate) fn load_config(path: &Path) -> Result<SiteConfig> {
    load_site_config(path).context("Failed to load lingo.toml")
}

/// The configured translation table, falling back to the built-in one
pub(crate) fn load_memory(path: &Path, config: &SiteConfig) -> Result<TranslationMemory> {
    match &config.translation.memory {
        Some(memory_path) => {
            let full_path = path.join(memory_path);
            TranslationMemory::load(&full_path)
                .with_context(|| format!("Failed to load {}", full_path.display()))
        }
        None => TranslationMemory::builtin().context("Built-in translation table is invalid"),
    }
}

/// Languages named on the command line, or the configured ones
pub(crate) fn parse_languages(codes: &[String], config: &SiteConfig) -> Result<Vec<Language>> {
    if codes.is_empty() {
        return Ok(config.translation.languages.clone());
    }

    let mut languages = Vec::new();
    for code in codes {
        let language: Language = code.parse()?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}

pub(crate) fn build_generator(
    path: &Path,
    config: &SiteConfig,
    memory: Arc<TranslationMemory>,
) -> TranslationGenerator {
    TranslationGenerator::new(path, HtmlTranslator::new(memory)).with_layout(config.site.clone())
}

pub(crate) fn print_stats(stats: &TranslationStats) {
    println!();
    println!("📊 Translation statistics");
    println!("   Files processed:    {}", stats.files_processed);
    println!("   Files translated:   {}", stats.files_translated);
    println!("   Total translations: {}", stats.total_translations);
    if stats.files_failed > 0 {
        println!("   Files failed:       {}", stats.files_failed);
    }
}
