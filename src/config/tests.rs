use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn book_cache_defaults() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.book_cache.enabled);
    assert_eq!(settings.book_cache.sweep_interval, Duration::from_secs(300));
    assert_eq!(settings.book_cache.max_age, Duration::from_secs(3600));
    assert_eq!(settings.catalog.timeout, Duration::from_secs(5));
    assert!(settings.catalog.base_url.is_none());
}

#[test]
fn book_cache_can_be_disabled_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        book_cache_enabled: Some(false),
        book_cache_max_age_seconds: Some(18_000),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.book_cache.enabled);
    assert_eq!(settings.book_cache.max_age, Duration::from_secs(18_000));
}

#[test]
fn zero_max_age_is_rejected() {
    let mut raw = RawSettings::default();
    raw.book_cache.max_age_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero max age");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "book_cache.max_age_seconds",
            ..
        }
    ));
}

#[test]
fn catalog_base_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.catalog.base_url = Some("http://catalog.internal:8080/v2".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    let url = settings.catalog.base_url.expect("base url");
    assert_eq!(url.as_str(), "http://catalog.internal:8080/v2/");
}

#[test]
fn catalog_base_url_must_be_http() {
    let mut raw = RawSettings::default();
    raw.catalog.base_url = Some("ftp://catalog.internal".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["shelfmark"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "shelfmark",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--catalog-url",
        "http://catalog:8080",
        "--book-cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.catalog.catalog_url.as_deref(),
                Some("http://catalog:8080")
            );
            assert_eq!(serve.overrides.book_cache_enabled, Some(false));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_lookup_arguments() {
    let args = CliArgs::parse_from([
        "shelfmark",
        "lookup",
        "--catalog-url",
        "http://catalog:8080",
        "--no-cache",
        "a",
        "b",
    ]);

    match args.command.expect("lookup command") {
        Command::Lookup(lookup) => {
            assert_eq!(
                lookup.catalog.catalog_url.as_deref(),
                Some("http://catalog:8080")
            );
            assert!(lookup.no_cache);
            assert_eq!(lookup.ids, vec!["a".to_string(), "b".to_string()]);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn lookup_requires_ids() {
    assert!(CliArgs::try_parse_from(["shelfmark", "lookup"]).is_err());
}
