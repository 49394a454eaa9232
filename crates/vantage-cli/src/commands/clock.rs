//! Console clock commands.

use anyhow::{Context, Result};
use vantage_types::datetime;

use crate::cli::LinkArgs;
use crate::config::Config;
use crate::util::{connect, parse_minute};

pub fn cmd_gettime(link: &LinkArgs, config: &Config) -> Result<()> {
    let mut station = connect(link, config)?;
    let now = station.get_time().context("Failed to read console time")?;
    println!("{}", datetime::format_seconds(now));
    Ok(())
}

pub fn cmd_settime(link: &LinkArgs, config: &Config, value: &str) -> Result<()> {
    // Parse before connecting so a typo fails fast.
    let target = parse_minute(value)?;

    let mut station = connect(link, config)?;
    let old = station.get_time().context("Failed to read console time")?;
    station
        .set_time(target)
        .context("Failed to set console time")?;
    let new = station.get_time().context("Failed to read console time")?;

    println!("Old value: {}", datetime::format_seconds(old));
    println!("New value: {}", datetime::format_seconds(new));
    Ok(())
}
