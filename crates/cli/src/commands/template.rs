use lingo_kit_core::Language;
use lingo_kit_generator::language_selector_html;
use lingo_kit_translator::escape_attribute;

/// Error page served for 404 and 500 responses
pub fn error_page(status: u16, title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{status} - {title}</title>
    <style>
        body {{ font-family: sans-serif; margin: 50px; }}
        h1 {{ color: #e74c3c; }}
        p {{ color: #7f8c8d; }}
        a {{ color: #3498db; }}
    </style>
</head>
<body>
    <h1>{status} - {title}</h1>
    <p>{message}</p>
    <a href="/">← Back to home</a>
</body>
</html>"#,
        status = status,
        title = escape_attribute(title),
        message = escape_attribute(message),
    )
}

pub fn not_found_page(path: &str) -> String {
    error_page(
        404,
        "Page not found",
        &format!("Sorry, /{} does not exist.", path.trim_start_matches('/')),
    )
}

pub fn internal_error_page() -> String {
    error_page(
        500,
        "Internal server error",
        "Sorry, something went wrong while serving this page.",
    )
}

/// Standalone page wrapping the language switcher
pub fn language_selector_page(current: Language) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{code}">
<head>
    <meta charset="UTF-8">
    <title>Language</title>
</head>
<body>
{selector}</body>
</html>"#,
        code = current.code(),
        selector = language_selector_html(current),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_escapes_title_and_message() {
        let page = error_page(500, "<b>", r#"it's "broken" & gone"#);
        assert!(page.contains("<title>500 - &lt;b&gt;</title>"));
        assert!(page.contains("it&#x27;s &quot;broken&quot; &amp; gone"));
    }

    #[test]
    fn test_not_found_page_escapes_path() {
        let page = not_found_page("/<script>alert(1)</script>");
        assert!(page.contains("404 - Page not found"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
    }

    #[test]
    fn test_language_selector_page() {
        let page = language_selector_page(Language::Fr);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<html lang=\"fr\">"));
        assert!(page.contains("<option value=\"fr\" selected>Français</option>"));
    }
}
