use super::{ensure_site_dir, load_config, load_memory};
use anyhow::Result;
use lingo_kit_core::config::CONFIG_FILE_NAME;
use std::path::PathBuf;

/// Missing strings listed per language before truncating
const MAX_MISSING_SHOWN: usize = 5;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());
    ensure_site_dir(&path)?;

    let config = load_config(&path)?;
    if path.join(CONFIG_FILE_NAME).exists() {
        println!("✓ {} valid", CONFIG_FILE_NAME);
    } else {
        println!("✓ No {} found, using defaults", CONFIG_FILE_NAME);
    }

    let languages: Vec<&str> = config
        .translation
        .languages
        .iter()
        .map(|lang| lang.code())
        .collect();
    println!("  Languages: {}", languages.join(", "));
    println!(
        "  Server: {}:{}",
        config.server.host, config.server.port
    );

    let mut warnings = 0;
    if !path.join(&config.site.index).is_file() {
        eprintln!("⚠ Index page not found: {}", config.site.index.display());
        warnings += 1;
    }
    if !path.join(&config.site.integrations_dir).is_dir() {
        eprintln!(
            "⚠ Integrations directory not found: {}",
            config.site.integrations_dir.display()
        );
        warnings += 1;
    }

    let memory = load_memory(&path, &config)?;
    let source = config
        .translation
        .memory
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    println!("✓ Translation table loaded ({}, {} strings)", source, memory.len());

    let coverage = memory.coverage();
    for language in &coverage.languages {
        let marker = if language.is_complete() { "✓" } else { "•" };
        println!(
            "  {} {}: {}/{} ({:.0}%)",
            marker,
            language.language.name(),
            language.translated,
            coverage.total_keys,
            language.percent()
        );

        // Only configured languages count as problems
        if config.translation.languages.contains(&language.language) && !language.is_complete() {
            warnings += 1;
            for missing in language.missing.iter().take(MAX_MISSING_SHOWN) {
                eprintln!("      missing: {:?}", missing);
            }
            if language.missing.len() > MAX_MISSING_SHOWN {
                eprintln!(
                    "      ... and {} more",
                    language.missing.len() - MAX_MISSING_SHOWN
                );
            }
        }
    }

    println!();
    if warnings == 0 {
        println!("✅ Site is ready to translate");
    } else {
        println!("⚠ Validation finished with {} warning(s)", warnings);
    }

    Ok(())
}
