// Country tables for the Cloudflare `CF-IPCountry` header

use lingo_kit_core::{Language, Region};

/// Header carrying the visitor's two-letter country code
pub const COUNTRY_HEADER: &str = "CF-IPCountry";

/// Trim and uppercase a raw header value; blank values count as absent
pub fn normalize_country(raw: &str) -> Option<String> {
    let country = raw.trim();
    if country.is_empty() {
        None
    } else {
        Some(country.to_ascii_uppercase())
    }
}

/// Region for a normalized country code. Unlisted countries are `GLOBAL`.
pub fn region_for_country(country: &str) -> Region {
    match country {
        "BR" => Region::Br,
        "PT" => Region::Pt,
        "US" | "AU" | "CA" => Region::Us,
        "GB" => Region::Gb,
        _ => Region::Global,
    }
}

/// Language for a normalized country code. Unlisted countries get Portuguese.
pub fn language_for_country(country: &str) -> Language {
    match country {
        "US" | "GB" | "AU" | "CA" => Language::En,
        "ES" | "MX" => Language::Es,
        "FR" => Language::Fr,
        _ => Language::Pt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_country() {
        assert_eq!(normalize_country(" br "), Some("BR".to_string()));
        assert_eq!(normalize_country("Us"), Some("US".to_string()));
        assert_eq!(normalize_country(""), None);
        assert_eq!(normalize_country("   "), None);
    }

    #[test]
    fn test_region_table() {
        assert_eq!(region_for_country("BR"), Region::Br);
        assert_eq!(region_for_country("PT"), Region::Pt);
        assert_eq!(region_for_country("AU"), Region::Us);
        assert_eq!(region_for_country("CA"), Region::Us);
        assert_eq!(region_for_country("GB"), Region::Gb);
        assert_eq!(region_for_country("MX"), Region::Global);
        assert_eq!(region_for_country("DE"), Region::Global);
    }

    #[test]
    fn test_language_table() {
        assert_eq!(language_for_country("BR"), Language::Pt);
        assert_eq!(language_for_country("GB"), Language::En);
        assert_eq!(language_for_country("MX"), Language::Es);
        assert_eq!(language_for_country("FR"), Language::Fr);
        assert_eq!(language_for_country("DE"), Language::Pt);
        assert_eq!(language_for_country("JP"), Language::Pt);
    }
}
