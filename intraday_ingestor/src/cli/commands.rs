use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    io::render::OutputFormat,
    models::timeframe::{Interval, Period},
    pipeline::reshape::DuplicatePolicy,
};

#[derive(Debug, Parser)]
#[command(name = "intraday", author, version, about)]
pub struct Cli {
    /// Path to an optional TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub retry: RetryArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// What to do when two bars share a date and time: reject, last-wins
    #[arg(long, global = true)]
    pub on_duplicate: Option<DuplicatePolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct RetryArgs {
    /// Retry failed provider calls (overrides the config file)
    #[arg(long, global = true, conflicts_with = "no_retry")]
    pub retry: bool,

    /// Call the provider once, without retries
    #[arg(long, global = true)]
    pub no_retry: bool,

    /// Total attempts per fetch, the first one included
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Pause between attempts, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format: table, csv, json
    #[arg(short, long, global = true, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch one symbol and print its closing-price matrix
    Fetch {
        /// Ticker symbol (e.g. "AAPL", "7010.SR")
        #[arg(short, long)]
        symbol: Option<String>,

        /// Lookback window: 7d, 14d, 30d, 60d, 90d
        #[arg(short, long)]
        duration: Option<Period>,

        /// Bar interval: 1m, 5m, 15m, 30m, 60m
        #[arg(short, long)]
        interval: Option<Interval>,
    },

    /// Prompt for symbol, duration and interval, then fetch; repeat until declined
    Interactive,
}
