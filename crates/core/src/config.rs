use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the per-site configuration file
pub const CONFIG_FILE_NAME: &str = "lingo.toml";

/// Raw TOML configuration structure
/// This matches the lingo.toml file structure exactly; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    site: RawSite,
    translation: RawTranslation,
    server: RawServer,
    geo: RawGeo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSite {
    index: Option<String>,
    integrations_dir: Option<String>,
    assets_dir: Option<String>,
    translated_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawTranslation {
    memory: Option<String>,
    languages: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    cache_html_secs: Option<u64>,
    cache_assets_secs: Option<u64>,
    cache_default_secs: Option<u64>,
    geo_cache_capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawGeo {
    prefix: Vec<RawPrefixRule>,
}

#[derive(Debug, Deserialize)]
struct RawPrefixRule {
    prefix: String,
    region: String,
}

/// Load `lingo.toml` from a site directory, falling back to defaults when
/// the directory has no configuration file
pub fn load_site_config<P: AsRef<Path>>(site_dir: P) -> Result<SiteConfig> {
    let path = site_dir.as_ref().join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    parse_site_toml(path)
}

/// Parse lingo.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse lingo.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let defaults = SiteConfig::default();

    let site = SiteLayout {
        index: optional_path(raw.site.index, "site.index")?.unwrap_or(defaults.site.index),
        integrations_dir: optional_path(raw.site.integrations_dir, "site.integrations_dir")?
            .unwrap_or(defaults.site.integrations_dir),
        assets_dir: optional_path(raw.site.assets_dir, "site.assets_dir")?
            .unwrap_or(defaults.site.assets_dir),
        translated_dir: optional_path(raw.site.translated_dir, "site.translated_dir")?
            .unwrap_or(defaults.site.translated_dir),
    };

    let languages = match raw.translation.languages {
        Some(codes) => parse_languages(&codes)?,
        None => defaults.translation.languages,
    };

    let translation = TranslationSettings {
        memory: optional_path(raw.translation.memory, "translation.memory")?,
        languages,
    };

    if raw.server.geo_cache_capacity == Some(0) {
        return Err(Error::ConfigParse(
            "server.geo_cache_capacity must be greater than zero".to_string(),
        ));
    }

    let server = ServerSettings {
        host: raw.server.host.unwrap_or(defaults.server.host),
        port: raw.server.port.unwrap_or(defaults.server.port),
        cache: CacheDurations {
            html: raw
                .server
                .cache_html_secs
                .unwrap_or(defaults.server.cache.html),
            assets: raw
                .server
                .cache_assets_secs
                .unwrap_or(defaults.server.cache.assets),
            default: raw
                .server
                .cache_default_secs
                .unwrap_or(defaults.server.cache.default),
        },
        geo_cache_capacity: raw.server.geo_cache_capacity,
    };

    let prefixes: Result<Vec<PrefixRule>> = raw
        .geo
        .prefix
        .into_iter()
        .map(|rule| {
            if rule.prefix.trim().is_empty() {
                return Err(Error::ConfigParse(
                    "Empty prefix in 'geo.prefix'".to_string(),
                ));
            }
            let region = Region::from_code(&rule.region).ok_or_else(|| {
                Error::ConfigParse(format!(
                    "Unknown region '{}' in 'geo.prefix' (expected BR, PT, US, GB or GLOBAL)",
                    rule.region
                ))
            })?;
            Ok(PrefixRule {
                prefix: rule.prefix.trim().to_string(),
                region,
            })
        })
        .collect();

    Ok(SiteConfig {
        site,
        translation,
        server,
        geo: GeoSettings {
            prefixes: prefixes?,
        },
    })
}

fn parse_languages(codes: &[String]) -> Result<Vec<Language>> {
    let mut languages = Vec::with_capacity(codes.len());
    for code in codes {
        let language = Language::from_code(code).ok_or_else(|| {
            Error::ConfigParse(format!(
                "Unsupported language '{}' in 'translation.languages'",
                code
            ))
        })?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}

fn optional_path(value: Option<String>, field_name: &str) -> Result<Option<PathBuf>> {
    value
        .map(|path| validate_relative_path(&path, field_name))
        .transpose()
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// It guards both configuration values and request paths handed to the
/// server, so a request can never resolve outside the site directory.
///
/// # Examples
///
/// ```text
/// validate_relative_path("integracoes/slack.html", "file")  → Ok(PathBuf)
/// validate_relative_path("/etc/passwd", "file")  → Err("Absolute paths not allowed...")
/// validate_relative_path("../../secret", "file")  → Err("Parent directory references...")
/// ```
pub fn validate_relative_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Reject absolute paths
    if path.is_absolute() || path_str.starts_with('/') || path_str.starts_with('\\') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if matches!(component, Component::ParentDir | Component::Prefix(_)) {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}
