//! Archive download command.

use anyhow::{Context, Result};
use vantage_core::{FetchWindow, fetch_archives};
use vantage_store::codec;

use crate::cli::{LinkArgs, StoreArgs};
use crate::config::Config;
use crate::style;
use crate::util::{connect, describe_count, parse_minute, resolve_delimiter, write_output};

pub fn cmd_archives(
    link: &LinkArgs,
    store: &StoreArgs,
    config: &Config,
    start: Option<&str>,
    stop: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let start = start.map(parse_minute).transpose()?;
    let stop = stop.map(parse_minute).transpose()?;
    let window = FetchWindow::between(start, stop);
    let delimiter = resolve_delimiter(store.delim.as_deref(), config)?;

    let mut station = connect(link, config)?;
    let sink = style::download_sink(quiet);
    let records =
        fetch_archives(&mut station, &window, sink.as_ref()).context("Failed to download archives")?;

    if !quiet {
        eprintln!("{}", describe_count(records.len()));
    }
    let text = codec::to_string(&records, true, delimiter)?;
    write_output(store.output.as_deref(), &text)
}
