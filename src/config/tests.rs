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
fn defaults_match_visit_gate_timings() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.sessions.skip_window, Duration::from_secs(120));
    assert_eq!(settings.sessions.poll_interval, Duration::from_millis(2_000));
    assert_eq!(settings.sessions.sign_in_path, "/auth/sign-in");
    assert_eq!(
        settings.qr.image_api_url.as_str(),
        "https://api.qrserver.com/v1/create-qr-code/"
    );
}

#[test]
fn public_base_url_defaults_to_listener_address() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(8080);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.server.public_base_url.as_str(),
        "http://127.0.0.1:8080/"
    );
}

#[test]
fn public_base_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.server.public_base_url = Some("https://brands.example.com/pages".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.server.public_base_url.as_str(),
        "https://brands.example.com/pages/"
    );
}

#[test]
fn rejects_non_http_qr_endpoint() {
    let mut raw = RawSettings::default();
    raw.qr.image_api_url = Some("ftp://qr.example.com/".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp must be rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "qr.image_api_url",
            ..
        }
    ));
}

#[test]
fn rejects_zero_skip_window() {
    let mut raw = RawSettings::default();
    raw.apply_serve_overrides(&ServeOverrides {
        sessions_skip_seconds: Some(0),
        ..Default::default()
    });
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn uploads_limit_defaults_to_10_mib() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(
        settings.uploads.max_request_bytes.get(),
        DEFAULT_UPLOAD_REQUEST_LIMIT_BYTES
    );
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_serve_overrides(&ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["brandpage"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "brandpage",
        "migrate",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "brandpage",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--sessions-poll-millis",
        "500",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.sessions_poll_millis, Some(500));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn relative_sign_in_path_is_rejected() {
    let mut raw = RawSettings::default();
    raw.sessions.sign_in_path = Some("auth/sign-in".to_string());

    let err = Settings::from_raw(raw).expect_err("relative path must fail");
    assert!(err.to_string().contains("sessions.sign_in_path"));
}
