use anyhow::{Context, Result};
use lingo_kit_core::config::CONFIG_FILE_NAME;
use lingo_kit_translator::TranslationMemory;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name of the scaffolded translation table
const MEMORY_FILE_NAME: &str = "translations.json";

/// Maximum directory depth scanned for pages
const MAX_SCAN_DEPTH: usize = 3;

const CONFIG_TEMPLATE: &str = r#"# lingo-kit site configuration

[site]
index = "index.html"
integrations_dir = "integracoes"
assets_dir = "assets"
translated_dir = "translated"

[translation]
memory = "translations.json"
languages = ["en"]

[server]
host = "127.0.0.1"
port = 5000
cache_html_secs = 3600
cache_assets_secs = 86400
cache_default_secs = 300
# Bound the locale cache for long-running servers
# geo_cache_capacity = 10000

# Development IP table. Requests whose IP starts with a prefix are placed
# in its region (BR, PT, US, GB or GLOBAL).
# [[geo.prefix]]
# prefix = "200."
# region = "BR"
"#;

/// Initialize a site directory for translation.
///
/// Writes `lingo.toml` and a starter `translations.json` (the built-in
/// table), then reports the pages found. Refuses to touch a directory that
/// already has a `lingo.toml`.
pub async fn run(path: PathBuf) -> Result<()> {
    println!("🌱 Initializing site at: {}", path.display());

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists in {}\nEdit it directly or remove it to start over",
            CONFIG_FILE_NAME,
            path.display()
        );
    }

    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("   ✓ Created {}", CONFIG_FILE_NAME);

    let memory_path = path.join(MEMORY_FILE_NAME);
    if memory_path.exists() {
        println!("   ✓ Keeping existing {}", MEMORY_FILE_NAME);
    } else {
        fs::write(&memory_path, TranslationMemory::builtin_json())
            .with_context(|| format!("Failed to write {}", memory_path.display()))?;
        println!("   ✓ Created {}", MEMORY_FILE_NAME);
    }

    let pages = scan_html_files(&path);
    println!("   ✓ Found {} HTML pages", pages.len());
    for page in pages.iter().take(10) {
        println!("     - {}", page.display());
    }
    if pages.len() > 10 {
        println!("     ... and {} more", pages.len() - 10);
    }

    if !path.join("index.html").exists() {
        eprintln!("   ⚠ Warning: index.html not found");
    }

    println!();
    println!("✅ Site initialized!");
    println!();
    println!("Next steps:");
    println!("   lingo-kit validate {}", path.display());
    println!("   lingo-kit translate {} --all", path.display());
    println!("   lingo-kit serve {}", path.display());

    Ok(())
}

/// HTML pages under `dir`, relative and sorted, skipping translated output
/// and hidden directories
fn scan_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut pages: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(MAX_SCAN_DEPTH)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name.starts_with('.') || name == "translated")
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .filter_map(|entry| entry.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect();
    pages.sort();
    pages
}
