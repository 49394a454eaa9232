//! Command-line interface for Davis Vantage weather stations.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gettime` | Print the console's current date and time |
//! | `settime` | Set the console clock |
//! | `info` | Display firmware and receiver information |
//! | `getperiod` | Print the archive period in minutes |
//! | `setperiod` | Set the archive period |
//! | `current` | Read one current-conditions record |
//! | `archives` | Download archive records between two datetimes |
//! | `update` | Append new archive records to a delimited store file |
//!
//! # Configuration
//!
//! The CLI reads defaults from `~/.config/vantage/config.toml` (or the
//! platform equivalent): `url`, `timeout`, and `delimiter`. Command-line
//! flags override the config file, and `VANTAGE_URL` sits between the two.
//!
//! # Examples
//!
//! Read the console clock:
//! ```bash
//! vantage gettime --url tcp:192.168.1.18:1111
//! ```
//!
//! Download a day of archives as CSV:
//! ```bash
//! vantage archives --start "2024-06-01 00:00" --stop "2024-06-02 00:00" --output day.csv
//! ```
//!
//! Keep a store file in sync:
//! ```bash
//! vantage update weather.csv
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod style;
pub mod util;
