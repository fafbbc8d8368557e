//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CatalogOverrides, CliArgs, Command, LookupArgs, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "shelfmark";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 5;
const DEFAULT_BOOK_CACHE_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_BOOK_CACHE_MAX_AGE_SECS: u64 = 3600;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub catalog: CatalogSettings,
    pub book_cache: BookCacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Base URL of the catalog service, always ending in `/`.
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BookCacheSettings {
    pub enabled: bool,
    pub sweep_interval: Duration,
    pub max_age: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("SHELFMARK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Lookup(args)) => raw.apply_catalog_overrides(&args.catalog),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    catalog: RawCatalogSettings,
    book_cache: RawBookCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.book_cache_enabled {
            self.book_cache.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.book_cache_sweep_interval_seconds {
            self.book_cache.sweep_interval_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.book_cache_max_age_seconds {
            self.book_cache.max_age_seconds = Some(seconds);
        }

        self.apply_catalog_overrides(&overrides.catalog);
    }

    fn apply_catalog_overrides(&mut self, overrides: &CatalogOverrides) {
        if let Some(url) = overrides.catalog_url.as_ref() {
            self.catalog.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.catalog_timeout_seconds {
            self.catalog.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            catalog,
            book_cache,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let catalog = build_catalog_settings(catalog)?;
        let book_cache = build_book_cache_settings(book_cache)?;

        Ok(Self {
            server,
            logging,
            catalog,
            book_cache,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = positive_seconds(
        server.graceful_shutdown_seconds,
        DEFAULT_GRACEFUL_SHUTDOWN_SECS,
        "server.graceful_shutdown_seconds",
    )?;

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_catalog_settings(catalog: RawCatalogSettings) -> Result<CatalogSettings, LoadError> {
    let base_url = catalog
        .base_url
        .and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .map(|value| parse_base_url(&value))
        .transpose()
        .map_err(|reason| LoadError::invalid("catalog.base_url", reason))?;

    let timeout_secs = positive_seconds(
        catalog.timeout_seconds,
        DEFAULT_CATALOG_TIMEOUT_SECS,
        "catalog.timeout_seconds",
    )?;

    Ok(CatalogSettings {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_book_cache_settings(
    book_cache: RawBookCacheSettings,
) -> Result<BookCacheSettings, LoadError> {
    let sweep_interval_secs = positive_seconds(
        book_cache.sweep_interval_seconds,
        DEFAULT_BOOK_CACHE_SWEEP_INTERVAL_SECS,
        "book_cache.sweep_interval_seconds",
    )?;
    let max_age_secs = positive_seconds(
        book_cache.max_age_seconds,
        DEFAULT_BOOK_CACHE_MAX_AGE_SECS,
        "book_cache.max_age_seconds",
    )?;

    Ok(BookCacheSettings {
        enabled: book_cache.enabled.unwrap_or(true),
        sweep_interval: Duration::from_secs(sweep_interval_secs),
        max_age: Duration::from_secs(max_age_secs),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCatalogSettings {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBookCacheSettings {
    enabled: Option<bool>,
    sweep_interval_seconds: Option<u64>,
    max_age_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_base_url(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value).map_err(|err| format!("invalid URL `{value}`: {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn positive_seconds(value: Option<u64>, default: u64, key: &'static str) -> Result<u64, LoadError> {
    let value = value.unwrap_or(default);
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(value)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
