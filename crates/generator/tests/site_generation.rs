use lingo_kit_core::Language;
use lingo_kit_generator::TranslationGenerator;
use lingo_kit_translator::{HtmlTranslator, TranslationMemory};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const INDEX: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <title>AI Factory | Automação e Templates com IA</title>
    <script>
        const labels = { save: "Salvar", title: "AI Factory | Automação e Templates com IA" };
        if (window.innerWidth < 768) { document.body.classList.add("mobile"); }
    </script>
</head>
<body>
    <input type="password" placeholder="Cole sua chave aqui...">
    <button id="generate">🏭 Gerador</button>
</body>
</html>
"#;

fn builtin_generator(dir: &TempDir) -> TranslationGenerator {
    let memory = TranslationMemory::builtin().unwrap();
    TranslationGenerator::new(dir.path(), HtmlTranslator::new(Arc::new(memory)))
}

fn script_block(html: &str) -> &str {
    let start = html.find("<script>").unwrap();
    let end = html.find("</script>").unwrap() + "</script>".len();
    &html[start..end]
}

#[test]
fn test_index_translation_keeps_scripts_intact() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();

    let mut generator = builtin_generator(&dir);
    let outputs = generator.translate_file("index.html", &[Language::En]).unwrap();

    let output_path = dir.path().join("translated/en/index.html");
    assert_eq!(outputs[&Language::En], output_path);

    let translated = fs::read_to_string(output_path).unwrap();
    assert!(translated.contains("<title>AI Factory | Automation and Templates with AI</title>"));
    assert!(translated.contains("placeholder=\"Paste your key here...\""));
    assert!(translated.contains(">🏭 Generator</button>"));
    assert!(translated.contains("<html lang=\"en\">"));
    assert_eq!(script_block(&translated), script_block(INDEX));
}

#[test]
fn test_full_run_writes_manifest() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    fs::create_dir_all(dir.path().join("integracoes")).unwrap();
    fs::write(
        dir.path().join("integracoes/google-sheets.html"),
        "<h1>🏭 Gerador</h1>",
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/app.js"), "console.log('ok');").unwrap();

    let mut generator = builtin_generator(&dir);
    generator.setup_directories().unwrap();
    generator
        .translate_file("index.html", &[Language::En, Language::Es, Language::Fr])
        .unwrap();
    let report = generator.translate_integrations("integracoes");
    assert!(report.is_clean());

    let manifest = generator.generate_translation_manifest().unwrap();
    assert_eq!(manifest.statistics.files_processed, 2);
    assert_eq!(manifest.statistics.files_translated, 4);
    assert_eq!(manifest.languages.len(), Language::ALL.len());

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("translated/manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["languages"]["fr"]["native_name"], "Français");
    assert_eq!(json["statistics"]["files_translated"], 4);

    assert!(dir.path().join("translated/es/assets/app.js").is_file());
    assert!(dir.path().join("translated/en/integracoes/google-sheets.html").is_file());
    assert!(!dir.path().join("translated/es/integracoes").exists());
}
