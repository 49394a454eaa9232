//! Utility functions for CLI operations.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use time::PrimitiveDateTime;
use vantage_core::Station;
use vantage_types::datetime;

use crate::cli::LinkArgs;
use crate::config::Config;

/// Link timeout when neither the flag nor the config file sets one.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolve the console URL: flag (or `VANTAGE_URL`) first, then the
/// config file.
pub fn resolve_url(link: &LinkArgs, config: &Config) -> Result<String> {
    link.url
        .clone()
        .or_else(|| config.url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No console URL specified. Use --url tcp:<host>:<port>, set VANTAGE_URL, \
                 or put url = \"...\" in the config file."
            )
        })
}

/// Open a console session from CLI arguments.
pub fn connect(link: &LinkArgs, config: &Config) -> Result<Station> {
    let url = resolve_url(link, config)?;
    let timeout = Duration::from_secs(
        link.timeout
            .or(config.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    );
    tracing::debug!("Connecting to {}", url);
    Station::from_url(&url, timeout).with_context(|| format!("Failed to connect to {}", url))
}

/// Parse a user-supplied datetime at minute precision.
pub fn parse_minute(s: &str) -> Result<PrimitiveDateTime> {
    datetime::parse_minutes(s)
        .with_context(|| format!("Invalid datetime '{}'. Use \"YYYY-MM-DD HH:MM\"", s))
}

/// Parse a delimiter argument, accepting the `\t` escape for tab.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    let literal = match s {
        "\\t" => "\t",
        other => other,
    };
    let bytes = literal.as_bytes();
    if bytes.len() != 1 {
        bail!("Delimiter must be a single character, got '{}'", s);
    }
    Ok(bytes[0])
}

/// Resolve the field delimiter: flag first, then the config file, then
/// a comma.
pub fn resolve_delimiter(flag: Option<&str>, config: &Config) -> Result<u8> {
    parse_delimiter(flag.or(config.delimiter.as_deref()).unwrap_or(","))
}

/// Write command output to a file or stdout.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            io::stdout().write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

/// Human summary of how many new records a download produced.
pub fn describe_count(count: usize) -> String {
    match count {
        0 => "No new records were found".to_string(),
        1 => "1 new record was found".to_string(),
        n => format!("{} new records were found", n),
    }
}
