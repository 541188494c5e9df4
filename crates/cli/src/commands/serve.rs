use super::template::{internal_error_page, language_selector_page, not_found_page};
use super::translate::{self, Steps};
use super::{build_generator, ensure_site_dir, load_config, load_memory, print_stats};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, Path as UrlPath, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use lingo_kit_core::{Language, Region, SiteConfig, validate_relative_path};
use lingo_kit_detector::cloudflare::COUNTRY_HEADER;
use lingo_kit_detector::{
    GeoLocationDetector, I18nMiddleware, LANGUAGE_COOKIE, RequestSignals, cookie_value,
};
use lingo_kit_generator::{LanguageInfo, MANIFEST_FILE_NAME, TranslationGenerator, language_catalog};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Lifetime of the `language` cookie (one year)
const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

/// Address reported when a request carries no client IP at all
const UNKNOWN_CLIENT_IP: &str = "127.0.0.1";

pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub generate: bool,
    pub watch: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    site_dir: PathBuf,
    config: Arc<SiteConfig>,
    i18n: Arc<I18nMiddleware>,
    debug: bool,
}

impl AppState {
    pub(crate) fn new(site_dir: &Path, config: SiteConfig, debug: bool) -> Result<Self> {
        let site_dir = site_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", site_dir.display()))?;
        let detector =
            GeoLocationDetector::from_settings(&config.geo, config.server.geo_cache_capacity);
        let i18n = I18nMiddleware::new(detector)
            .with_translated_dir(config.site.translated_dir.to_string_lossy());

        Ok(Self {
            site_dir,
            config: Arc::new(config),
            i18n: Arc::new(i18n),
            debug,
        })
    }

    fn index_path(&self) -> String {
        self.config.site.index.to_string_lossy().replace('\\', "/")
    }
}

/// Serve the site with per-request language detection.
///
/// This command:
/// - Loads lingo.toml and the translation table
/// - Optionally generates every translation first (`--generate`)
/// - Serves Portuguese originals and translated copies with fallback
/// - Exposes locale, language and manifest endpoints for the front-end
/// - Optionally re-translates pages when their source changes (`--watch`)
pub async fn run(path: PathBuf, options: ServeOptions) -> Result<()> {
    println!("🌍 Starting i18n server...");
    println!("   Site: {}", path.display());

    ensure_site_dir(&path)?;
    let config = load_config(&path)?;
    let memory = Arc::new(load_memory(&path, &config)?);
    println!("   ✓ Translation table: {} strings", memory.len());

    if options.generate {
        println!();
        let mut generator = build_generator(&path, &config, memory.clone());
        translate::generate(
            &mut generator,
            &config,
            &config.translation.languages,
            Steps::all(),
        )?;
        print_stats(&generator.stats());
        println!();
    }

    let host = options.host.unwrap_or_else(|| config.server.host.clone());
    let port = options.port.unwrap_or(config.server.port);
    let state = AppState::new(&path, config.clone(), options.debug)?;

    if options.watch {
        let generator = build_generator(&state.site_dir, &config, memory);
        let languages = config.translation.languages.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_sources(generator, languages).await {
                eprintln!("File watcher error: {}", e);
            }
        });
        println!("   ✓ Watching HTML sources for changes");
    }

    if options.debug {
        println!("   ✓ Logging request signals");
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;

    println!("\n🚀 Serving at: http://{}:{}", host, port);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

pub(crate) fn router(state: AppState) -> Router {
    let assets_dir = &state.config.site.assets_dir;
    let assets_route = format!("/{}", assets_dir.to_string_lossy().trim_matches('/'));
    let assets = ServeDir::new(state.site_dir.join(assets_dir));

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/index.html", get(index_handler))
        .route("/api/locale", get(locale_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/manifest", get(manifest_handler))
        .route("/language-selector.html", get(selector_handler))
        .nest_service(&assets_route, assets)
        .route("/{*path}", get(file_handler));

    if state.debug {
        app = app.layer(middleware::from_fn_with_state(state.clone(), log_signals));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Detection signals and conditional headers of one request
#[derive(Debug, Clone)]
struct ClientContext {
    ip: String,
    accept_language: Option<String>,
    country: Option<String>,
    cookie_language: Option<String>,
    if_none_match: Option<String>,
}

impl ClientContext {
    fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            ip: client_ip(headers, peer),
            accept_language: header_str(headers, header::ACCEPT_LANGUAGE.as_str())
                .map(str::to_string),
            country: header_str(headers, COUNTRY_HEADER).map(str::to_string),
            cookie_language: header_str(headers, header::COOKIE.as_str())
                .and_then(|cookies| cookie_value(cookies, LANGUAGE_COOKIE))
                .map(str::to_string),
            if_none_match: header_str(headers, header::IF_NONE_MATCH.as_str())
                .map(str::to_string),
        }
    }

    fn signals(&self) -> RequestSignals<'_> {
        RequestSignals {
            ip_address: &self.ip,
            accept_language: self.accept_language.as_deref(),
            cloudflare_country: self.country.as_deref(),
            cookie_language: self.cookie_language.as_deref(),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent when the router is driven without a socket (tests)
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket address
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for")
        && let Some(first) = forwarded
            .split(',')
            .map(str::trim)
            .find(|entry| !entry.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT_IP.to_string())
}

/// Log what language detection sees for every request
async fn log_signals(
    State(state): State<AppState>,
    client: ClientContext,
    request: Request,
    next: Next,
) -> Response {
    let language = state.i18n.get_language_from_request(&client.signals());
    info!(
        method = %request.method(),
        path = %request.uri().path(),
        ip = %client.ip,
        accept_language = ?client.accept_language,
        cf_country = ?client.country,
        cookie = ?client.cookie_language,
        language = %language,
        "request signals"
    );
    next.run(request).await
}

/// Portuguese visitors get the index; everyone else is sent to their translation
async fn root_handler(State(state): State<AppState>, client: ClientContext) -> Response {
    let language = state.i18n.get_language_from_request(&client.signals());
    let index = state.index_path();

    if language.is_base() {
        serve_file(&state, &client, &index, Language::Pt).await
    } else {
        Redirect::temporary(&format!("/{}/{}", language.code(), index)).into_response()
    }
}

async fn index_handler(State(state): State<AppState>, client: ClientContext) -> Response {
    let index = state.index_path();
    serve_file(&state, &client, &index, Language::Pt).await
}

/// Pages under a language code (`/en/...`) or Portuguese originals
async fn file_handler(
    State(state): State<AppState>,
    client: ClientContext,
    UrlPath(path): UrlPath<String>,
) -> Response {
    let (language, relative) = split_language(&path);
    let relative = if relative.is_empty() || relative.ends_with('/') {
        format!("{}{}", relative, state.index_path())
    } else {
        relative.to_string()
    };

    serve_file(&state, &client, &relative, language).await
}

/// Split a leading language code off a request path
fn split_language(path: &str) -> (Language, &str) {
    let path = path.trim_start_matches('/');
    let (first, rest) = path.split_once('/').unwrap_or((path, ""));

    match Language::from_code(first) {
        Some(language) if first.len() == 2 => (language, rest),
        _ => (Language::Pt, path),
    }
}

/// Serve `relative` in `language`, falling back to the Portuguese original
async fn serve_file(
    state: &AppState,
    client: &ClientContext,
    relative: &str,
    language: Language,
) -> Response {
    // Translated copies are only reachable through their `/<lang>/` path
    let Ok(requested) = validate_relative_path(relative, "path") else {
        return not_found(relative);
    };
    if requested.starts_with(&state.config.site.translated_dir) {
        return not_found(relative);
    }

    let mapped = state.i18n.get_file_path(language, relative);
    let (full_path, served) = match resolve_file(&state.site_dir, &mapped) {
        Some(path) => (path, language),
        None if !language.is_base() => match resolve_file(&state.site_dir, relative) {
            Some(path) => (path, Language::Pt),
            None => return not_found(relative),
        },
        None => return not_found(relative),
    };

    let body = match tokio::fs::read(&full_path).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read {}: {}", full_path.display(), e);
            return internal_error();
        }
    };

    let etag = format!("\"{:x}\"", Sha256::digest(&body));
    let cache_control = format!(
        "public, max-age={}",
        state.config.server.cache.for_path(relative)
    );

    if client
        .if_none_match
        .as_deref()
        .is_some_and(|tags| etag_matches(tags, &etag))
    {
        return (
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response();
    }

    let content_type = mime_guess::from_path(&full_path)
        .first_or_octet_stream()
        .to_string();
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/",
        LANGUAGE_COOKIE,
        served.code(),
        COOKIE_MAX_AGE_SECS
    );

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
            (header::ETAG, etag),
            (header::CONTENT_LANGUAGE, served.code().to_string()),
            (header::SET_COOKIE, cookie),
        ],
        body,
    )
        .into_response()
}

/// Existing file inside `site_dir`; symlinks leading outside are refused
fn resolve_file(site_dir: &Path, relative: &str) -> Option<PathBuf> {
    site_dir
        .join(relative)
        .canonicalize()
        .ok()
        .filter(|path| path.starts_with(site_dir) && path.is_file())
}

fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

fn not_found(path: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(not_found_page(path))).into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(internal_error_page())).into_response()
}

#[derive(Debug, Serialize)]
struct LocaleInfo {
    language: Language,
    language_name: &'static str,
    region: Region,
    timezone: &'static str,
    currency: &'static str,
    locale_code: String,
    should_use_portuguese: bool,
}

/// Detected locale for front-end scripts (the cookie does not take part)
async fn locale_handler(State(state): State<AppState>, client: ClientContext) -> Json<LocaleInfo> {
    let locale = state.i18n.get_locale(&client.signals());
    Json(LocaleInfo {
        language: locale.language,
        language_name: locale.language.native_name(),
        region: locale.region,
        timezone: locale.timezone,
        currency: locale.currency,
        locale_code: locale.locale_code(),
        should_use_portuguese: locale.should_use_portuguese(),
    })
}

#[derive(Debug, Serialize)]
struct LanguagesResponse {
    languages: BTreeMap<String, LanguageInfo>,
    current_language: Language,
}

async fn languages_handler(
    State(state): State<AppState>,
    client: ClientContext,
) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: language_catalog(),
        current_language: state.i18n.get_language_from_request(&client.signals()),
    })
}

/// The generated manifest, byte for byte
async fn manifest_handler(State(state): State<AppState>) -> Response {
    let manifest_path = state
        .site_dir
        .join(&state.config.site.translated_dir)
        .join(MANIFEST_FILE_NAME);

    match tokio::fs::read(&manifest_path).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Translation manifest not found" })),
        )
            .into_response(),
    }
}

async fn selector_handler(State(state): State<AppState>, client: ClientContext) -> Html<String> {
    let language = state.i18n.get_language_from_request(&client.signals());
    Html(language_selector_page(language))
}

/// Re-translate HTML sources as they change
async fn watch_sources(mut generator: TranslationGenerator, languages: Vec<Language>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    let root = generator.base_dir().to_path_buf();
    let translated_dir = generator.translated_dir();
    watcher.watch(&root, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            continue;
        }

        for page in event
            .paths
            .iter()
            .filter_map(|path| source_page(path, &root, &translated_dir))
        {
            println!("   📝 {} changed, re-translating...", page.display());
            match generator.translate_file(&page, &languages) {
                Ok(outputs) => info!("Re-translated {} into {} languages", page.display(), outputs.len()),
                Err(e) => warn!("Failed to re-translate {}: {}", page.display(), e),
            }
        }
    }

    Ok(())
}

/// Site-relative path of a changed source page, ignoring translated output,
/// hidden files and non-HTML files
fn source_page(path: &Path, root: &Path, translated_dir: &Path) -> Option<PathBuf> {
    if path.starts_with(translated_dir) {
        return None;
    }

    let name = path.file_name()?.to_string_lossy();
    let is_html = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if !is_html || name.starts_with('.') {
        return None;
    }

    path.strip_prefix(root).ok().map(Path::to_path_buf)
}
