use super::{ensure_site_dir, load_config};
use anyhow::Result;
use chrono::Local;
use lingo_kit_detector::{GeoLocationDetector, I18nMiddleware, RequestSignals};
use std::path::PathBuf;

/// Print the locale a request with these signals would get
pub async fn run(
    path: PathBuf,
    ip: String,
    accept_language: Option<String>,
    country: Option<String>,
    cookie: Option<String>,
) -> Result<()> {
    ensure_site_dir(&path)?;
    let config = load_config(&path)?;
    let detector = GeoLocationDetector::from_settings(&config.geo, config.server.geo_cache_capacity);
    let middleware = I18nMiddleware::new(detector)
        .with_translated_dir(config.site.translated_dir.to_string_lossy());

    let signals = RequestSignals {
        ip_address: &ip,
        accept_language: accept_language.as_deref(),
        cloudflare_country: country.as_deref(),
        cookie_language: cookie.as_deref(),
    };

    let locale = middleware.get_locale(&signals);
    let language = middleware.get_language_from_request(&signals);

    println!("🔎 Locale for {}", ip);
    println!("   Region:       {}", locale.region);
    println!("   Locale:       {}", locale.locale_code());
    println!("   Timezone:     {}", locale.timezone);
    println!("   Currency:     {}", locale.currency);
    println!(
        "   Numbers:      1{}234{}56",
        locale.thousands_separator, locale.decimal_separator
    );
    println!("   Today:        {}", locale.format_date(Local::now().date_naive()));
    println!(
        "   Serves:       {} ({})",
        language.native_name(),
        middleware.get_file_path(language, &config.site.index.to_string_lossy())
    );
    if language != locale.language {
        println!("   (language cookie overrides detected {})", locale.language);
    }

    Ok(())
}
