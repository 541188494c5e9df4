use lingo_kit_core::Language;

/// First supported language named by an `Accept-Language` header.
///
/// Entries are taken in header order; `;q=` weights and region subtags are
/// ignored, so `en-US,pt;q=0.9` resolves to English.
pub fn parse_accept_language(header: &str) -> Option<Language> {
    header.split(',').find_map(|entry| {
        let tag = entry.split(';').next()?.trim();
        let primary = tag.split(|c| c == '-' || c == '_').next()?;
        Language::from_code(primary)
    })
}
