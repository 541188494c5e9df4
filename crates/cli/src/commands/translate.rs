use super::{build_generator, ensure_site_dir, load_config, load_memory, parse_languages, print_stats};
use anyhow::{Context, Result};
use lingo_kit_core::{Language, SiteConfig};
use lingo_kit_generator::TranslationGenerator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which generation steps to run; the manifest is always written
#[derive(Debug, Clone, Copy, Default)]
pub struct Steps {
    pub setup: bool,
    pub index: bool,
    pub integrations: bool,
}

impl Steps {
    pub fn all() -> Self {
        Self {
            setup: true,
            index: true,
            integrations: true,
        }
    }
}

/// Generate translated copies of a site
pub async fn run(path: PathBuf, language_codes: Vec<String>, steps: Steps) -> Result<()> {
    ensure_site_dir(&path)?;
    let config = load_config(&path)?;
    let languages = parse_languages(&language_codes, &config)?;
    let memory = Arc::new(load_memory(&path, &config)?);

    println!("🌍 Translating site: {}", path.display());
    let codes: Vec<&str> = languages.iter().map(|lang| lang.code()).collect();
    println!("   Languages: {}", codes.join(", "));
    println!();

    let mut generator = build_generator(&path, &config, memory);
    generate(&mut generator, &config, &languages, steps)?;

    print_stats(&generator.stats());
    println!();
    println!("🎉 Translation complete!");
    println!("   Output: {}", generator.translated_dir().display());

    Ok(())
}

/// Run the selected steps and write the manifest.
///
/// A failing index page is reported and the run continues.
pub(crate) fn generate(
    generator: &mut TranslationGenerator,
    config: &SiteConfig,
    languages: &[Language],
    steps: Steps,
) -> Result<()> {
    if steps.setup {
        println!("📁 Creating directory structure...");
        let dirs = generator
            .setup_directories()
            .context("Failed to create translation directories")?;
        println!("   ✓ {} language directories ready", dirs.len());
    }

    if steps.index {
        let index = &config.site.index;
        println!("📄 Translating {}...", index.display());
        match generator.translate_file(index, languages) {
            Ok(outputs) => {
                for (language, output) in &outputs {
                    println!("   ✓ {}: {}", language, relative_to(output, generator.base_dir()));
                }
            }
            Err(e) => eprintln!("   ❌ {}", e),
        }
    }

    if steps.integrations {
        let dir = &config.site.integrations_dir;
        println!("🔌 Translating {}/ (English)...", dir.display());
        let report = generator.translate_integrations(dir);
        println!("   ✓ {} pages translated", report.succeeded.len());
        for (page, error) in &report.failed {
            eprintln!("   ❌ {}: {}", page.display(), error);
        }
    }

    println!("📋 Writing translation manifest...");
    generator
        .generate_translation_manifest()
        .context("Failed to write translation manifest")?;
    println!("   ✓ manifest.json written");

    Ok(())
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
