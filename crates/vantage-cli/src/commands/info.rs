//! Firmware and receiver information command.

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::{LinkArgs, OutputFormat};
use crate::config::Config;
use crate::util::connect;

pub fn cmd_info(link: &LinkArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut station = connect(link, config)?;
    let info = station
        .info()
        .context("Failed to read console information")?;

    match format {
        OutputFormat::Text => {
            println!("Firmware date:    {}", info.firmware_date);
            println!("Firmware version: {}", info.firmware_version);
            println!("Diagnostics:      {}", info.diagnostics);
        }
        OutputFormat::Json => {
            let value = json!({
                "firmware_date": info.firmware_date,
                "firmware_version": info.firmware_version,
                "diagnostics": info.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
