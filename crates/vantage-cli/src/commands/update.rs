//! Incremental store update command.

use std::path::Path;

use anyhow::{Context, Result};
use vantage_store::{SyncOptions, sync_store};

use crate::cli::LinkArgs;
use crate::config::Config;
use crate::style;
use crate::util::{connect, describe_count, resolve_delimiter};

pub fn cmd_update(
    link: &LinkArgs,
    config: &Config,
    db: &Path,
    delim: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let delimiter = resolve_delimiter(delim, config)?;
    let mut station = connect(link, config)?;
    let sink = style::download_sink(quiet);

    let options = SyncOptions { delimiter };
    let outcome = sync_store(db, &mut station, sink.as_ref(), &options)
        .with_context(|| format!("Failed to update {}", db.display()))?;

    if !quiet {
        eprintln!("{}", describe_count(outcome.appended));
    }
    Ok(())
}
