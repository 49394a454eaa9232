//! Archive period commands.

use anyhow::{Context, Result};

use crate::cli::LinkArgs;
use crate::config::Config;
use crate::util::connect;

pub fn cmd_getperiod(link: &LinkArgs, config: &Config) -> Result<()> {
    let mut station = connect(link, config)?;
    let minutes = station
        .archive_period()
        .context("Failed to read archive period")?;
    println!("{} minutes", minutes);
    Ok(())
}

pub fn cmd_setperiod(link: &LinkArgs, config: &Config, minutes: u8) -> Result<()> {
    let mut station = connect(link, config)?;
    let old = station
        .archive_period()
        .context("Failed to read archive period")?;

    tracing::warn!("Changing the archive period clears the console's archive memory");
    station
        .set_archive_period(minutes)
        .context("Failed to set archive period")?;
    let new = station
        .archive_period()
        .context("Failed to read archive period")?;

    println!("Old value: {} minutes", old);
    println!("New value: {} minutes", new);
    Ok(())
}
