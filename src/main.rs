use std::{process, sync::Arc};

use shelfmark::{
    application::{book_info::BookInfoService, catalog::BookCatalog, error::AppError},
    cache::{BookCacheConfig, BookInfoStore, IntervalTimer, run_eviction_loop},
    config,
    infra::{
        catalog_client::HttpBookCatalog,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Lookup(args) => run_lookup(settings, args).await,
    }
}

fn build_book_service(
    settings: &config::Settings,
    cache_config: &BookCacheConfig,
    store: Arc<BookInfoStore>,
) -> Result<BookInfoService, AppError> {
    let catalog: Arc<dyn BookCatalog> = Arc::new(HttpBookCatalog::new(&settings.catalog)?);
    Ok(BookInfoService::new(cache_config, store, catalog))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let cache_config = BookCacheConfig::from(&settings.book_cache);
    let store = Arc::new(BookInfoStore::new());
    let books = Arc::new(build_book_service(
        &settings,
        &cache_config,
        Arc::clone(&store),
    )?);

    // The sweeper only has work to do while lookups go through the cache.
    let sweeper = if cache_config.enabled {
        let (timer, stop) = IntervalTimer::new(cache_config.sweep_interval());
        let handle = tokio::spawn(run_eviction_loop(
            Arc::clone(&store),
            cache_config.max_age(),
            timer,
        ));
        Some((handle, stop))
    } else {
        None
    };

    let router = http::build_router(HttpState { books });
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        addr = %settings.server.addr,
        cache_enabled = cache_config.enabled,
        sweep_interval_secs = cache_config.sweep_interval_seconds,
        max_age_secs = cache_config.max_age_seconds,
        "Shelfmark listening"
    );

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")));

    if let Some((handle, stop)) = sweeper {
        stop.stop();
        match tokio::time::timeout(settings.server.graceful_shutdown, handle).await {
            Ok(Ok(summary)) => info!(
                sweeps = summary.sweeps,
                evicted = summary.evicted,
                "Book cache sweeper joined"
            ),
            Ok(Err(err)) => warn!(error = %err, "Book cache sweeper task failed"),
            Err(_) => warn!("Book cache sweeper did not stop before the shutdown deadline"),
        }
    }

    result
}

async fn run_lookup(settings: config::Settings, args: config::LookupArgs) -> Result<(), AppError> {
    let mut cache_config = BookCacheConfig::from(&settings.book_cache);
    if args.no_cache {
        cache_config.enabled = false;
    }
    let service = build_book_service(&settings, &cache_config, Arc::new(BookInfoStore::new()))?;

    let books = service.get_books_info(&args.ids).await?;
    let missing: Vec<&String> = args
        .ids
        .iter()
        .filter(|id| !books.iter().any(|book| &book.id == *id))
        .collect();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Catalog did not recognise some book ids");
    }

    let output = serde_json::to_string_pretty(&books)
        .map_err(|err| AppError::unexpected(format!("failed to encode books: {err}")))?;
    println!("{output}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
