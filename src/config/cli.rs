use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Shelfmark binary.
#[derive(Debug, Parser)]
#[command(name = "shelfmark", version, about = "Shelfmark reading-status service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SHELFMARK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Shelfmark HTTP service.
    Serve(Box<ServeArgs>),
    /// Resolve book ids once through the cache and print them as JSON.
    Lookup(LookupArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CatalogOverrides {
    /// Override the catalog service base URL.
    #[arg(long = "catalog-url", value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Override the catalog request timeout.
    #[arg(long = "catalog-timeout-seconds", value_name = "SECONDS")]
    pub catalog_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub catalog: CatalogOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Toggle the book-info cache.
    #[arg(
        long = "book-cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub book_cache_enabled: Option<bool>,

    /// Override the cache eviction sweep interval.
    #[arg(long = "book-cache-sweep-interval-seconds", value_name = "SECONDS")]
    pub book_cache_sweep_interval_seconds: Option<u64>,

    /// Override the age after which cached books are evicted.
    #[arg(long = "book-cache-max-age-seconds", value_name = "SECONDS")]
    pub book_cache_max_age_seconds: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    #[command(flatten)]
    pub catalog: CatalogOverrides,

    /// Query the catalog directly instead of going through the cache.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue)]
    pub no_cache: bool,

    /// Book ids to resolve.
    #[arg(value_name = "ID", required = true, num_args = 1..)]
    pub ids: Vec<String>,
}
