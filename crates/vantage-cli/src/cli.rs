//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable console connection arguments
#[derive(Debug, Clone, Args)]
pub struct LinkArgs {
    /// Console connection URL like tcp:192.168.1.18:1111, or use VANTAGE_URL env var
    #[arg(short, long, env = "VANTAGE_URL")]
    pub url: Option<String>,

    /// Link timeout in seconds [default: 10]
    #[arg(short = 'T', long)]
    pub timeout: Option<u64>,
}

/// Reusable delimited-output arguments
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Field delimiter, "\t" for tab [default: ,]
    #[arg(long)]
    pub delim: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "vantage")]
#[command(author, version, about = "CLI for Davis Vantage weather stations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the console's current date and time
    Gettime {
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Set the console clock
    Settime {
        #[command(flatten)]
        link: LinkArgs,

        /// New console time, like "2024-06-01 12:30"
        datetime: String,
    },

    /// Display firmware and receiver information
    Info {
        #[command(flatten)]
        link: LinkArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the archive period in minutes
    Getperiod {
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Set the archive period (clears the console's archive memory)
    Setperiod {
        #[command(flatten)]
        link: LinkArgs,

        /// Minutes between archive records: 1, 5, 10, 15, 30, 60 or 120
        period: u8,
    },

    /// Read one current-conditions record
    Current {
        #[command(flatten)]
        link: LinkArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Download archive records between two datetimes
    Archives {
        #[command(flatten)]
        link: LinkArgs,

        #[command(flatten)]
        store: StoreArgs,

        /// Inclusive lower bound, like "2024-06-01 00:00" [default: everything]
        #[arg(long)]
        start: Option<String>,

        /// Inclusive upper bound, like "2024-06-02 00:00" [default: now]
        #[arg(long)]
        stop: Option<String>,
    },

    /// Append new archive records to a delimited store file
    Update {
        #[command(flatten)]
        link: LinkArgs,

        /// Store file to update (created when absent)
        db: PathBuf,

        /// Field delimiter used by the store, "\t" for tab [default: ,]
        #[arg(long)]
        delim: Option<String>,
    },
}
