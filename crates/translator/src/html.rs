//! HTML page translation.
//!
//! The translator tokenizes the serialized page (comments, declarations,
//! start and end tags, raw-text element bodies and text runs) and keeps a
//! stack of open elements. Text is only handed to the translation memory
//! when no open element is preserved, so markup, scripts, styles and code
//! samples come out byte-for-byte as they went in. Everything that is not
//! translated is copied verbatim.

use crate::escape::{decode_entities, escape_attribute, escape_text};
use crate::memory::TranslationMemory;
use lingo_kit_core::Language;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Elements whose content is never translated
const PRESERVED_ELEMENTS: &[&str] = &["script", "style", "code", "pre", "textarea", "kbd", "samp"];

/// Elements whose body is raw text up to the matching end tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Elements that never have an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Attributes that carry human-readable text
const TEXT_ATTRIBUTES: &[&str] = &["placeholder", "alt", "title", "aria-label"];

static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();

fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

/// Result of translating one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedHtml {
    pub html: String,
    /// Number of strings replaced by the translation memory
    pub replacements: usize,
}

/// Translates the visible text of HTML documents
#[derive(Debug, Clone)]
pub struct HtmlTranslator {
    memory: Arc<TranslationMemory>,
}

impl HtmlTranslator {
    pub fn new(memory: Arc<TranslationMemory>) -> Self {
        Self { memory }
    }

    pub fn memory(&self) -> &TranslationMemory {
        &self.memory
    }

    /// Translate a page into `language`; Portuguese returns the input as-is
    pub fn translate_html(&self, html: &str, language: Language) -> String {
        self.translate_document(html, language).html
    }

    /// Translate a page and report how many strings were replaced
    pub fn translate_document(&self, html: &str, language: Language) -> TranslatedHtml {
        if language.is_base() {
            return TranslatedHtml {
                html: html.to_string(),
                replacements: 0,
            };
        }

        Walker::new(html, &self.memory, language).run()
    }
}

/// Whether a trimmed text run looks machine-oriented rather than prose.
///
/// Skips selectors (`#id`, `.class`), URLs, e-mail addresses, `::` paths,
/// fragments shorter than three characters and short all-caps acronyms.
pub fn should_skip_text(text: &str) -> bool {
    text.starts_with('#')
        || text.starts_with('.')
        || text.starts_with("http")
        || text.contains('@')
        || text.contains("::")
        || text.chars().count() < 3
        || is_short_acronym(text)
}

fn is_short_acronym(text: &str) -> bool {
    text.chars().any(char::is_uppercase)
        && !text.chars().any(char::is_lowercase)
        && text.chars().count() < 10
}

#[derive(Debug, Clone, Copy)]
enum Markup {
    Comment,
    Declaration,
    EndTag,
    StartTag,
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    opaque: bool,
}

#[derive(Debug)]
struct Attribute<'t> {
    name: String,
    value: Option<AttributeValue<'t>>,
}

/// Attribute value and its byte span inside the tag
#[derive(Debug)]
struct AttributeValue<'t> {
    raw: &'t str,
    start: usize,
    end: usize,
    quoted: bool,
}

struct Walker<'a> {
    source: &'a str,
    /// ASCII-lowercased copy of `source` with identical byte offsets
    lower: String,
    memory: &'a TranslationMemory,
    language: Language,
    out: String,
    open: Vec<OpenElement>,
    replacements: usize,
}

impl<'a> Walker<'a> {
    fn new(source: &'a str, memory: &'a TranslationMemory, language: Language) -> Self {
        Self {
            source,
            lower: source.to_ascii_lowercase(),
            memory,
            language,
            out: String::with_capacity(source.len() + source.len() / 8),
            open: Vec::new(),
            replacements: 0,
        }
    }

    fn run(mut self) -> TranslatedHtml {
        let source = self.source;
        let mut pos = 0;
        let mut text_start = 0;

        while let Some(offset) = source[pos..].find('<') {
            let lt = pos + offset;
            match markup_at(source.as_bytes(), lt) {
                Some(kind) => {
                    self.flush_text(text_start, lt);
                    pos = self.consume(kind, lt);
                    text_start = pos;
                }
                None => pos = lt + 1,
            }
        }
        self.flush_text(text_start, source.len());

        TranslatedHtml {
            html: self.out,
            replacements: self.replacements,
        }
    }

    fn consume(&mut self, kind: Markup, start: usize) -> usize {
        let source = self.source;
        let len = source.len();

        let end = match kind {
            Markup::Comment => source[start + 4..]
                .find("-->")
                .map(|i| start + 4 + i + 3)
                .unwrap_or(len),
            Markup::Declaration => source[start..]
                .find('>')
                .map(|i| start + i + 1)
                .unwrap_or(len),
            Markup::EndTag => {
                let end = source[start..]
                    .find('>')
                    .map(|i| start + i + 1)
                    .unwrap_or(len);
                let name = tag_name(&self.lower, start + 2);
                self.close(&name);
                end
            }
            Markup::StartTag => return self.consume_start_tag(start),
        };

        self.out.push_str(&source[start..end]);
        end
    }

    fn consume_start_tag(&mut self, start: usize) -> usize {
        let source = self.source;
        let end = find_tag_end(source.as_bytes(), start + 1)
            .map(|i| i + 1)
            .unwrap_or(source.len());
        let tag = &source[start..end];
        let name = tag_name(&self.lower, start + 1);
        let self_closing = tag.ends_with("/>");
        let attributes = parse_attributes(tag, 1 + name.len(), tag_body_end(tag));

        let opted_out = attributes.iter().any(|attribute| {
            attribute.name == "translate"
                && attribute
                    .value
                    .as_ref()
                    .is_some_and(|value| value.raw.trim().eq_ignore_ascii_case("no"))
        });
        let opaque =
            self.is_opaque() || opted_out || PRESERVED_ELEMENTS.contains(&name.as_str());

        if opaque {
            self.out.push_str(tag);
        } else {
            let rewritten = self.rewrite_tag(tag, &name, &attributes);
            self.out.push_str(&rewritten);
        }

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return end;
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let content_end = self.find_end_tag(&name, end);
            self.out.push_str(&source[end..content_end]);
            return content_end;
        }

        if name == "title" {
            let content_end = self.find_end_tag("title", end);
            let content = &source[end..content_end];
            if opaque {
                self.out.push_str(content);
            } else {
                self.translate_run(content, true);
            }
            return content_end;
        }

        self.open.push(OpenElement { name, opaque });
        end
    }

    /// Rewrite translatable attribute values of a start tag
    fn rewrite_tag(&mut self, tag: &str, name: &str, attributes: &[Attribute<'_>]) -> String {
        let mut edits: Vec<(usize, usize, String)> = Vec::new();

        if name == "meta"
            && is_description_meta(attributes)
            && let Some(value) = attribute_value(attributes, "content")
            && let Some(translated) = self.lookup(value.raw.trim())
        {
            edits.push(value_edit(value, &translated));
        }

        for attribute in attributes
            .iter()
            .filter(|attribute| TEXT_ATTRIBUTES.contains(&attribute.name.as_str()))
        {
            let Some(value) = &attribute.value else {
                continue;
            };
            if value.raw.trim().is_empty() {
                continue;
            }
            if let Some(translated) = self.lookup(value.raw.trim()) {
                edits.push(value_edit(value, &translated));
            }
        }

        self.replacements += edits.len();

        if name == "html" {
            let code = self.language.code();
            match attribute_value(attributes, "lang") {
                Some(value) if value.quoted => edits.push((value.start, value.end, code.to_string())),
                Some(value) => edits.push((value.start, value.end, format!("\"{}\"", code))),
                None => {
                    let at = 1 + name.len();
                    edits.push((at, at, format!(" lang=\"{}\"", code)));
                }
            }
        }

        if edits.is_empty() {
            return tag.to_string();
        }

        edits.sort_by(|a, b| b.0.cmp(&a.0));
        let mut rewritten = tag.to_string();
        for (start, end, replacement) in edits {
            rewritten.replace_range(start..end, &replacement);
        }
        rewritten
    }

    fn flush_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let text = &self.source[start..end];
        if self.is_opaque() {
            self.out.push_str(text);
        } else {
            self.translate_run(text, false);
        }
    }

    /// Translate a text run, keeping its surrounding whitespace exactly
    fn translate_run(&mut self, raw: &str, unconditional: bool) {
        let trimmed = raw.trim();
        if trimmed.is_empty() || (!unconditional && should_skip_text(trimmed)) {
            self.out.push_str(raw);
            return;
        }

        match self.lookup(trimmed) {
            Some(translated) => {
                let lead = raw.len() - raw.trim_start().len();
                let trail = raw.trim_end().len();
                self.out.push_str(&raw[..lead]);
                self.out.push_str(&escape_text(&translated));
                self.out.push_str(&raw[trail..]);
                self.replacements += 1;
            }
            None => self.out.push_str(raw),
        }
    }

    /// Translated text for a raw (entity-encoded) source string, if it changes
    fn lookup(&self, raw: &str) -> Option<String> {
        let decoded = decode_entities(raw);
        let translated = self.memory.translate(&decoded, self.language);
        (translated != decoded.as_ref()).then(|| translated.to_string())
    }

    fn is_opaque(&self) -> bool {
        self.open.last().is_some_and(|element| element.opaque)
    }

    /// Pop back to the innermost open element with this name; stray end tags are ignored
    fn close(&mut self, name: &str) {
        if let Some(index) = self.open.iter().rposition(|element| element.name == name) {
            self.open.truncate(index);
        }
    }

    fn find_end_tag(&self, name: &str, from: usize) -> usize {
        self.lower[from..]
            .find(&format!("</{}", name))
            .map(|i| from + i)
            .unwrap_or(self.source.len())
    }
}

fn markup_at(bytes: &[u8], pos: usize) -> Option<Markup> {
    let next = *bytes.get(pos + 1)?;
    if bytes[pos..].starts_with(b"<!--") {
        Some(Markup::Comment)
    } else if next == b'!' || next == b'?' {
        Some(Markup::Declaration)
    } else if next == b'/' {
        bytes
            .get(pos + 2)
            .filter(|b| b.is_ascii_alphabetic())
            .map(|_| Markup::EndTag)
    } else if next.is_ascii_alphabetic() {
        Some(Markup::StartTag)
    } else {
        None
    }
}

/// Index of the `>` closing a tag, ignoring any inside quoted attribute values
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut last_significant = 0u8;

    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if (b == b'"' || b == b'\'') && last_significant == b'=' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
        if !b.is_ascii_whitespace() {
            last_significant = b;
        }
    }
    None
}

fn tag_name(lower: &str, from: usize) -> String {
    lower[from..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_'))
        .map(char::from)
        .collect()
}

fn tag_body_end(tag: &str) -> usize {
    if tag.ends_with("/>") {
        tag.len() - 2
    } else if tag.ends_with('>') {
        tag.len() - 1
    } else {
        tag.len()
    }
}

fn parse_attributes(tag: &str, from: usize, to: usize) -> Vec<Attribute<'_>> {
    if from >= to {
        return Vec::new();
    }

    attribute_regex()
        .captures_iter(&tag[from..to])
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = [(2, true), (3, true), (4, false)]
                .into_iter()
                .find_map(|(group, quoted)| {
                    caps.get(group).map(|m| AttributeValue {
                        raw: m.as_str(),
                        start: from + m.start(),
                        end: from + m.end(),
                        quoted,
                    })
                });
            Some(Attribute { name, value })
        })
        .collect()
}

fn attribute_value<'b, 't>(
    attributes: &'b [Attribute<'t>],
    name: &str,
) -> Option<&'b AttributeValue<'t>> {
    attributes
        .iter()
        .find(|attribute| attribute.name == name)
        .and_then(|attribute| attribute.value.as_ref())
}

/// `<meta name="description">`, `<meta property="og:description">` and friends
fn is_description_meta(attributes: &[Attribute<'_>]) -> bool {
    ["name", "property", "itemprop"].iter().any(|key| {
        attribute_value(attributes, key).is_some_and(|value| {
            value
                .raw
                .trim()
                .to_ascii_lowercase()
                .ends_with("description")
        })
    })
}

fn value_edit(value: &AttributeValue<'_>, translated: &str) -> (usize, usize, String) {
    let escaped = escape_attribute(translated);
    let replacement = if value.quoted {
        escaped
    } else {
        format!("\"{}\"", escaped)
    };
    (value.start, value.end, replacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn translator() -> HtmlTranslator {
        let memory = TranslationMemory::new()
            .with_entry("Salvar", Language::En, "Save")
            .with_entry("Cancelar", Language::En, "Cancel")
            .with_entry("Comece Agora", Language::En, "Get Started")
            .with_entry("Perguntas & Respostas", Language::En, "Q&A")
            .with_entry("Cole sua chave aqui...", Language::En, "Paste your key here...")
            .with_entry("Automação com IA", Language::En, "Automation with AI")
            .with_entry("Automação com IA", Language::Es, "Automatización con IA")
            .with_entry("Descrição do site", Language::En, "Site description")
            .with_entry("FAQ", Language::En, "Questions");
        HtmlTranslator::new(Arc::new(memory))
    }

    #[test]
    fn test_portuguese_returns_input_unchanged() {
        let html = "<p>Salvar</p><script>var x = 1;</script>";
        assert_eq!(translator().translate_html(html, Language::Pt), html);
    }

    #[test]
    fn test_translates_text_nodes() {
        let html = "<div><button>Salvar</button><button>Cancelar</button></div>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<div><button>Save</button><button>Cancel</button></div>"
        );
    }

    #[test]
    fn test_preserves_surrounding_whitespace() {
        let html = "<p>\n    Comece Agora\t\n</p>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<p>\n    Get Started\t\n</p>"
        );
    }

    #[test]
    fn test_translates_title() {
        let html = "<head><title> Automação com IA </title></head>";
        assert_eq!(
            translator().translate_html(html, Language::Es),
            "<head><title> Automatización con IA </title></head>"
        );
    }

    #[test]
    fn test_script_and_style_are_byte_identical() {
        let html = "<script>\n  if (a < b) { alert(\"Salvar\"); }\n</script>\
                    <style>.x::before { content: \"Salvar\"; }</style><p>Salvar</p>";
        let translated = translator().translate_html(html, Language::En);
        assert!(translated.starts_with(
            "<script>\n  if (a < b) { alert(\"Salvar\"); }\n</script>\
             <style>.x::before { content: \"Salvar\"; }</style>"
        ));
        assert!(translated.ends_with("<p>Save</p>"));
    }

    #[test]
    fn test_code_and_pre_are_preserved() {
        let html = "<pre><code>Salvar</code>\nCancelar</pre><p>Cancelar</p><code>Salvar</code>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<pre><code>Salvar</code>\nCancelar</pre><p>Cancel</p><code>Salvar</code>"
        );
    }

    #[test]
    fn test_nested_markup_inside_preserved_element() {
        let html = "<pre><b>Salvar</b> <i>Cancelar</i></pre><b>Salvar</b>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<pre><b>Salvar</b> <i>Cancelar</i></pre><b>Save</b>"
        );
    }

    #[test]
    fn test_translate_no_opt_out() {
        let html = "<div translate=\"no\"><span>Salvar</span></div><span>Salvar</span>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<div translate=\"no\"><span>Salvar</span></div><span>Save</span>"
        );
    }

    #[test]
    fn test_meta_description_only() {
        let html = "<meta name=\"description\" content=\"Descrição do site\">\
                    <meta name=\"keywords\" content=\"Descrição do site\">\
                    <meta property=\"og:description\" content=\"Descrição do site\">";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<meta name=\"description\" content=\"Site description\">\
             <meta name=\"keywords\" content=\"Descrição do site\">\
             <meta property=\"og:description\" content=\"Site description\">"
        );
    }

    #[test]
    fn test_meta_description_attribute_order() {
        let html = "<meta content='Descrição do site' name=\"Description\"/>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<meta content='Site description' name=\"Description\"/>"
        );
    }

    #[test]
    fn test_meta_description_padded_content() {
        let html = "<meta name=\"description\" content=\"  Descrição do site \">";
        let translated = translator().translate_document(html, Language::En);
        assert_eq!(
            translated.html,
            "<meta name=\"description\" content=\"Site description\">"
        );
        assert_eq!(translated.replacements, 1);
    }

    #[test]
    fn test_translates_placeholder_and_title_attributes() {
        let html = "<input id=\"key\" placeholder=\"Cole sua chave aqui...\">\
                    <a href=\"/\" title=\"Salvar\">x</a>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<input id=\"key\" placeholder=\"Paste your key here...\">\
             <a href=\"/\" title=\"Save\">x</a>"
        );
    }

    #[test]
    fn test_machine_attributes_untouched() {
        let html = "<div id=\"Salvar\" class=\"Salvar\" data-label=\"Salvar\">Cancelar</div>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<div id=\"Salvar\" class=\"Salvar\" data-label=\"Salvar\">Cancel</div>"
        );
    }

    #[test]
    fn test_html_lang_attribute() {
        let t = translator();
        assert_eq!(
            t.translate_html("<html lang=\"pt-BR\"><p>Salvar</p></html>", Language::En),
            "<html lang=\"en\"><p>Save</p></html>"
        );
        assert_eq!(
            t.translate_html("<HTML><body></body></HTML>", Language::Fr),
            "<HTML lang=\"fr\"><body></body></HTML>"
        );
    }

    #[test]
    fn test_entities_are_decoded_for_lookup() {
        let html = "<h2>Perguntas &amp; Respostas</h2>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<h2>Q&amp;A</h2>"
        );
    }

    #[test]
    fn test_comments_and_doctype_untouched() {
        let html = "<!DOCTYPE html><!-- Salvar --><p>Salvar</p>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<!DOCTYPE html><!-- Salvar --><p>Save</p>"
        );
    }

    #[test]
    fn test_unclosed_elements() {
        let html = "<ul><li>Salvar<li>Cancelar</ul>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<ul><li>Save<li>Cancel</ul>"
        );
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        let html = "<a data-x=\"a > b\" href=\"#\">Salvar</a>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<a data-x=\"a > b\" href=\"#\">Save</a>"
        );
    }

    #[test]
    fn test_literal_less_than_in_text() {
        let html = "<p>1 < 2</p><p>Salvar</p>";
        assert_eq!(
            translator().translate_html(html, Language::En),
            "<p>1 < 2</p><p>Save</p>"
        );
    }

    #[test]
    fn test_acronyms_are_skipped_in_text_but_not_in_title() {
        let t = translator();
        assert_eq!(t.translate_html("<p>FAQ</p>", Language::En), "<p>FAQ</p>");
        assert_eq!(
            t.translate_html("<title>FAQ</title>", Language::En),
            "<title>Questions</title>"
        );
    }

    #[test]
    fn test_replacement_count() {
        let html = "<html lang=\"pt\"><title>Salvar</title>\
                    <input placeholder=\"Cancelar\"><p>Comece Agora</p><p>Desconhecido</p></html>";
        let result = translator().translate_document(html, Language::En);
        assert_eq!(result.replacements, 3);
    }

    #[test]
    fn test_should_skip_text() {
        assert!(should_skip_text("#gerador"));
        assert!(should_skip_text(".card"));
        assert!(should_skip_text("https://n8n.io"));
        assert!(should_skip_text("contato@aifactory.dev"));
        assert!(should_skip_text("std::fmt"));
        assert!(should_skip_text("ok"));
        assert!(should_skip_text("API"));
        assert!(should_skip_text("N8N KEY"));
        assert!(!should_skip_text("Salvar"));
        assert!(!should_skip_text("Doutor N8N"));
        assert!(!should_skip_text("🏭 Gerador"));
        assert!(!should_skip_text("UPPERCASE TITLE"));
    }

    proptest! {
        #[test]
        fn prop_portuguese_identity(html in ".*") {
            prop_assert_eq!(translator().translate_html(&html, Language::Pt), html);
        }

        #[test]
        fn prop_empty_memory_leaves_documents_untouched(
            html in "[a-zA-Z0-9 <>/=\"'!\\-\n]{0,120}"
        ) {
            prop_assume!(!html.to_ascii_lowercase().contains("<html"));
            let translator = HtmlTranslator::new(Arc::new(TranslationMemory::new()));
            for language in Language::ALL {
                prop_assert_eq!(translator.translate_html(&html, language), html.clone());
            }
        }
    }
}
