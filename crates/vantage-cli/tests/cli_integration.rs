//! Argument-parsing tests for the `vantage` binary.
//!
//! These exercise the clap definitions without a console attached; the
//! command implementations themselves are covered by the library crates.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use vantage_cli::cli::{Cli, Commands, OutputFormat};

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_update_parses_url_and_store() {
    let cli = Cli::parse_from([
        "vantage",
        "update",
        "--url",
        "tcp:localhost:1111",
        "weather.csv",
    ]);
    match cli.command {
        Commands::Update { link, db, delim } => {
            assert_eq!(link.url.as_deref(), Some("tcp:localhost:1111"));
            assert_eq!(db, PathBuf::from("weather.csv"));
            assert!(delim.is_none());
        }
        _ => panic!("expected update command"),
    }
}

#[test]
fn test_archives_window_flags() {
    let cli = Cli::parse_from([
        "vantage",
        "archives",
        "--start",
        "2024-06-01 00:00",
        "--stop",
        "2024-06-02 00:00",
        "--output",
        "day.csv",
    ]);
    match cli.command {
        Commands::Archives {
            store, start, stop, ..
        } => {
            assert_eq!(start.as_deref(), Some("2024-06-01 00:00"));
            assert_eq!(stop.as_deref(), Some("2024-06-02 00:00"));
            assert_eq!(store.output, Some(PathBuf::from("day.csv")));
        }
        _ => panic!("expected archives command"),
    }
}

#[test]
fn test_info_json_format() {
    let cli = Cli::parse_from(["vantage", "info", "--format", "json"]);
    match cli.command {
        Commands::Info { format, .. } => assert_eq!(format, OutputFormat::Json),
        _ => panic!("expected info command"),
    }
}

#[test]
fn test_quiet_flag_is_global() {
    let cli = Cli::parse_from(["vantage", "gettime", "--quiet"]);
    assert!(cli.quiet);
    assert!(!cli.verbose);
}

#[test]
fn test_settime_requires_a_datetime() {
    assert!(Cli::try_parse_from(["vantage", "settime"]).is_err());
}

#[test]
fn test_update_requires_a_store_path() {
    assert!(Cli::try_parse_from(["vantage", "update"]).is_err());
}

#[test]
fn test_timeout_short_flag() {
    let cli = Cli::parse_from(["vantage", "gettime", "-T", "5"]);
    match cli.command {
        Commands::Gettime { link } => assert_eq!(link.timeout, Some(5)),
        _ => panic!("expected gettime command"),
    }
}
