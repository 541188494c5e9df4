use crate::manifest::{MANIFEST_FILE_NAME, TranslationManifest};
use crate::stats::{BatchReport, TranslationStats};
use lingo_kit_core::{Error, Language, Result, SiteLayout, validate_relative_path};
use lingo_kit_translator::HtmlTranslator;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Writes translated copies of a site's pages under `translated/<lang>/`.
///
/// Runs are sequential. Single-file translation fails on a missing
/// source; directory runs log failures and carry on.
pub struct TranslationGenerator {
    base_dir: PathBuf,
    layout: SiteLayout,
    translator: HtmlTranslator,
    stats: TranslationStats,
}

impl TranslationGenerator {
    pub fn new(base_dir: impl Into<PathBuf>, translator: HtmlTranslator) -> Self {
        Self {
            base_dir: base_dir.into(),
            layout: SiteLayout::default(),
            translator,
            stats: TranslationStats::default(),
        }
    }

    pub fn with_layout(mut self, layout: SiteLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Absolute location of the translated tree
    pub fn translated_dir(&self) -> PathBuf {
        self.base_dir.join(&self.layout.translated_dir)
    }

    pub fn stats(&self) -> TranslationStats {
        self.stats
    }

    /// Create `translated/<lang>/` for every non-Portuguese language and give
    /// each a copy of the asset tree unless it already has one.
    ///
    /// Returns the language directories.
    pub fn setup_directories(&self) -> Result<Vec<PathBuf>> {
        let translated_dir = self.translated_dir();
        let assets_src = self.base_dir.join(&self.layout.assets_dir);
        let mut created = Vec::new();

        for language in Language::targets() {
            let lang_dir = translated_dir.join(language.code());
            fs::create_dir_all(&lang_dir)?;

            let assets_dst = lang_dir.join(&self.layout.assets_dir);
            if assets_src.is_dir() && !assets_dst.exists() {
                let copied = copy_tree(&assets_src, &assets_dst)?;
                debug!("Copied {} asset files to {}", copied, assets_dst.display());
            }

            created.push(lang_dir);
        }

        info!("Translation directories ready in {}", translated_dir.display());
        Ok(created)
    }

    /// Translate one page into each of `languages`.
    ///
    /// `source` is relative to the site root. Portuguese maps to the source
    /// file itself and nothing is written for it. Returns the path of the
    /// page in every requested language.
    pub fn translate_file(
        &mut self,
        source: impl AsRef<Path>,
        languages: &[Language],
    ) -> Result<BTreeMap<Language, PathBuf>> {
        let source = source.as_ref();
        let relative = validate_relative_path(&source.to_string_lossy(), "source")?;
        let source_path = self.base_dir.join(&relative);

        if !source_path.is_file() {
            return Err(Error::NotFound(source_path));
        }

        let content = fs::read_to_string(&source_path)?;
        self.stats.files_processed += 1;

        let mut outputs = BTreeMap::new();
        for &language in languages {
            if language.is_base() {
                outputs.insert(language, source_path.clone());
                continue;
            }

            let translated = self.translator.translate_document(&content, language);
            let output_path = self.translated_dir().join(language.code()).join(&relative);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, &translated.html)?;

            debug!(
                "{} -> {} ({} strings)",
                relative.display(),
                output_path.display(),
                translated.replacements
            );
            self.stats.files_translated += 1;
            self.stats.total_translations += translated.replacements;
            outputs.insert(language, output_path);
        }

        Ok(outputs)
    }

    /// Translate every `*.html` file directly inside `dir` (relative to the
    /// site root), in name order.
    ///
    /// A missing directory yields an empty report. Failing files are logged,
    /// counted and skipped.
    pub fn translate_directory(
        &mut self,
        dir: impl AsRef<Path>,
        languages: &[Language],
    ) -> BatchReport {
        let dir = dir.as_ref();
        let full_dir = self.base_dir.join(dir);
        let mut report = BatchReport::default();

        let files = match html_files(&full_dir) {
            Ok(Some(files)) => files,
            Ok(None) => {
                warn!("Directory not found: {}", full_dir.display());
                return report;
            }
            Err(e) => {
                warn!("Failed to list {}: {}", full_dir.display(), e);
                return report;
            }
        };

        info!("Found {} HTML files in {}", files.len(), dir.display());

        for file_name in files {
            let relative = dir.join(&file_name);
            match self.translate_file(&relative, languages) {
                Ok(_) => report.succeeded.push(relative),
                Err(e) => {
                    warn!("Failed to translate {}: {}", relative.display(), e);
                    self.stats.files_failed += 1;
                    report.failed.push((relative, e.to_string()));
                }
            }
        }

        report
    }

    /// Translate the integration pages in `dir` into English
    pub fn translate_integrations(&mut self, dir: impl AsRef<Path>) -> BatchReport {
        self.translate_directory(dir, &[Language::En])
    }

    /// Write `translated/manifest.json` from scratch and return it
    pub fn generate_translation_manifest(&self) -> Result<TranslationManifest> {
        let manifest = TranslationManifest::new(self.stats);
        let translated_dir = self.translated_dir();
        fs::create_dir_all(&translated_dir)?;

        let manifest_path = translated_dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&manifest_path, json)?;

        info!("Translation manifest written to {}", manifest_path.display());
        Ok(manifest)
    }
}

/// Sorted names of the `.html` files in `dir`, or `None` if it does not exist
fn html_files(dir: &Path) -> Result<Option<Vec<PathBuf>>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(ext) = entry.path().extension()
            && ext.eq_ignore_ascii_case("html")
        {
            files.push(PathBuf::from(entry.file_name()));
        }
    }
    files.sort();
    Ok(Some(files))
}

/// Recursively copy `src` into `dst`, returning the number of files copied
fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_kit_translator::TranslationMemory;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn generator(dir: &TempDir) -> TranslationGenerator {
        let memory = TranslationMemory::new()
            .with_entry("Salvar", Language::En, "Save")
            .with_entry("Salvar", Language::Es, "Guardar")
            .with_entry("Cancelar", Language::En, "Cancel");
        TranslationGenerator::new(dir.path(), HtmlTranslator::new(Arc::new(memory)))
    }

    fn write(dir: &TempDir, relative: &str, content: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_setup_directories_copies_assets_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "assets/css/site.css", "body {}");
        write(&dir, "assets/logo.svg", "<svg/>");

        let created = generator(&dir).setup_directories().unwrap();
        assert_eq!(created.len(), 3);
        for code in ["en", "es", "fr"] {
            let lang_dir = dir.path().join("translated").join(code);
            assert!(lang_dir.join("assets/css/site.css").is_file());
            assert!(lang_dir.join("assets/logo.svg").is_file());
        }
        assert!(!dir.path().join("translated/pt").exists());

        // Existing copies are left alone
        let copied = dir.path().join("translated/en/assets/logo.svg");
        fs::write(&copied, "edited").unwrap();
        generator(&dir).setup_directories().unwrap();
        assert_eq!(fs::read_to_string(copied).unwrap(), "edited");
    }

    #[test]
    fn test_setup_directories_without_assets() {
        let dir = TempDir::new().unwrap();
        generator(&dir).setup_directories().unwrap();
        assert!(dir.path().join("translated/fr").is_dir());
        assert!(!dir.path().join("translated/fr/assets").exists());
    }

    #[test]
    fn test_translate_file_writes_each_language() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/form.html", "<button>Salvar</button>");

        let mut generator = generator(&dir);
        let outputs = generator
            .translate_file("pages/form.html", &[Language::Pt, Language::En, Language::Es])
            .unwrap();

        assert_eq!(outputs[&Language::Pt], dir.path().join("pages/form.html"));
        assert_eq!(
            outputs[&Language::En],
            dir.path().join("translated/en/pages/form.html")
        );
        assert_eq!(
            fs::read_to_string(&outputs[&Language::En]).unwrap(),
            "<button>Save</button>"
        );
        assert_eq!(
            fs::read_to_string(&outputs[&Language::Es]).unwrap(),
            "<button>Guardar</button>"
        );
        assert!(!dir.path().join("translated/pt").exists());

        let stats = generator.stats();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_translated, 2);
        assert_eq!(stats.total_translations, 2);
    }

    #[test]
    fn test_translate_file_missing_source() {
        let dir = TempDir::new().unwrap();
        let mut generator = generator(&dir);
        let result = generator.translate_file("nope.html", &[Language::En]);

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(generator.stats().files_processed, 0);
    }

    #[test]
    fn test_translate_file_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let mut generator = generator(&dir);
        assert!(generator.translate_file("../secret.html", &[Language::En]).is_err());
        assert!(generator.translate_file("/etc/passwd", &[Language::En]).is_err());
    }

    #[test]
    fn test_translate_directory_is_sorted_and_flat() {
        let dir = TempDir::new().unwrap();
        write(&dir, "integracoes/b.html", "<p>Cancelar</p>");
        write(&dir, "integracoes/a.html", "<p>Salvar</p>");
        write(&dir, "integracoes/notes.txt", "Salvar");
        write(&dir, "integracoes/nested/c.html", "<p>Salvar</p>");

        let mut generator = generator(&dir);
        let report = generator.translate_integrations("integracoes");

        assert_eq!(
            report.succeeded,
            vec![
                PathBuf::from("integracoes/a.html"),
                PathBuf::from("integracoes/b.html")
            ]
        );
        assert!(report.is_clean());
        assert_eq!(
            fs::read_to_string(dir.path().join("translated/en/integracoes/b.html")).unwrap(),
            "<p>Cancel</p>"
        );
        assert!(!dir.path().join("translated/en/integracoes/nested").exists());
        assert!(!dir.path().join("translated/es").exists());
    }

    #[test]
    fn test_html_files_lists_top_level_pages() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/z.HTML", "<p>Salvar</p>");
        write(&dir, "pages/m.html", "<p>Salvar</p>");
        write(&dir, "pages/readme.md", "Salvar");
        write(&dir, "pages/deep/a.html", "<p>Salvar</p>");
        fs::create_dir_all(dir.path().join("pages/folder.html")).unwrap();

        let files = html_files(&dir.path().join("pages")).unwrap().unwrap();
        assert_eq!(files, vec![PathBuf::from("m.html"), PathBuf::from("z.HTML")]);
        assert!(html_files(&dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn test_translate_directory_missing_dir() {
        let dir = TempDir::new().unwrap();
        let report = generator(&dir).translate_directory("missing", &[Language::En]);
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_translate_directory_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        write(&dir, "integracoes/a.html", "<p>Salvar</p>");
        write(&dir, "integracoes/z.html", "<p>Salvar</p>");
        fs::write(dir.path().join("integracoes/m.html"), [0xff, 0xfe, 0x00]).unwrap();

        let mut generator = generator(&dir);
        let report = generator.translate_integrations("integracoes");

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PathBuf::from("integracoes/m.html"));
        assert_eq!(generator.stats().files_failed, 1);
        assert!(dir.path().join("translated/en/integracoes/z.html").is_file());
    }

    #[test]
    fn test_manifest_lists_all_languages() {
        let dir = TempDir::new().unwrap();
        write(&dir, "index.html", "<p>Salvar</p>");

        let mut generator = generator(&dir);
        generator.translate_file("index.html", &[Language::En]).unwrap();
        let manifest = generator.generate_translation_manifest().unwrap();

        let on_disk: TranslationManifest = serde_json::from_str(
            &fs::read_to_string(dir.path().join("translated/manifest.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(on_disk, manifest);
        for language in Language::ALL {
            assert!(on_disk.languages.contains_key(language.code()));
        }
        assert_eq!(on_disk.statistics.files_processed, 1);
        assert_eq!(on_disk.statistics.files_translated, 1);
    }

    #[test]
    fn test_custom_layout() {
        let dir = TempDir::new().unwrap();
        write(&dir, "home.html", "<p>Salvar</p>");

        let layout = SiteLayout {
            translated_dir: PathBuf::from("out/i18n"),
            ..SiteLayout::default()
        };
        let mut generator = generator(&dir).with_layout(layout);
        generator.translate_file("home.html", &[Language::En]).unwrap();

        assert!(dir.path().join("out/i18n/en/home.html").is_file());
    }
}
