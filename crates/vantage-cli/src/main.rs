//! `vantage` binary entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vantage_cli::cli::{Cli, Commands};
use vantage_cli::{commands, config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so record output can be piped or redirected.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config();

    match &cli.command {
        Commands::Gettime { link } => commands::cmd_gettime(link, &config),
        Commands::Settime { link, datetime } => commands::cmd_settime(link, &config, datetime),
        Commands::Info { link, format } => commands::cmd_info(link, &config, *format),
        Commands::Getperiod { link } => commands::cmd_getperiod(link, &config),
        Commands::Setperiod { link, period } => commands::cmd_setperiod(link, &config, *period),
        Commands::Current { link, store } => commands::cmd_current(link, store, &config),
        Commands::Archives {
            link,
            store,
            start,
            stop,
        } => commands::cmd_archives(
            link,
            store,
            &config,
            start.as_deref(),
            stop.as_deref(),
            cli.quiet,
        ),
        Commands::Update { link, db, delim } => {
            commands::cmd_update(link, &config, db, delim.as_deref(), cli.quiet)
        }
    }
}
