use lingo_kit_core::Language;
use std::fmt::Write;

/// Language switcher snippet for page headers and footers.
///
/// Picking a language stores it in the `language` cookie for a year and
/// navigates between `/<path>` (Portuguese) and `/<code>/<path>`.
pub fn language_selector_html(current: Language) -> String {
    let mut html = String::from(
        "<div class=\"language-selector\">\n\
         \x20   <label for=\"lang-select\">🌍 Language:</label>\n\
         \x20   <select id=\"lang-select\" onchange=\"changeLanguage(this.value)\">\n",
    );

    for language in Language::ALL {
        let selected = if language == current { " selected" } else { "" };
        let _ = writeln!(
            html,
            "        <option value=\"{}\"{}>{}</option>",
            language.code(),
            selected,
            language.native_name()
        );
    }

    let codes = Language::targets()
        .map(Language::code)
        .collect::<Vec<_>>()
        .join("|");

    html.push_str("    </select>\n</div>\n<script>\nfunction changeLanguage(lang) {\n");
    html.push_str("    document.cookie = `language=${lang}; path=/; max-age=31536000`;\n");
    let _ = writeln!(
        html,
        "    const path = window.location.pathname.replace(/^\\/({})\\//, '/');",
        codes
    );
    html.push_str(
        "    window.location.href = lang === 'pt' ? path : `/${lang}${path}`;\n}\n</script>\n",
    );
    html
}
