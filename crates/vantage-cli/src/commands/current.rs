//! Current-conditions command.

use anyhow::{Context, Result};
use vantage_store::codec;
use vantage_types::RecordSet;

use crate::cli::{LinkArgs, StoreArgs};
use crate::config::Config;
use crate::util::{connect, resolve_delimiter, write_output};

pub fn cmd_current(link: &LinkArgs, store: &StoreArgs, config: &Config) -> Result<()> {
    let delimiter = resolve_delimiter(store.delim.as_deref(), config)?;

    let mut station = connect(link, config)?;
    let record = station
        .current_record()
        .context("Failed to read current conditions")?;

    let mut set = RecordSet::new();
    set.append(record);
    let text = codec::to_string(&set, true, delimiter)?;
    write_output(store.output.as_deref(), &text)
}
