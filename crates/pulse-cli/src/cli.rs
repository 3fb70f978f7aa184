//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Usage analytics for creator accounts.
///
/// Records usage events (plays, purchases, gems, likes, shares) and reports
/// cumulative metrics plus a per-day series over a trailing window.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a usage event.
    Record {
        /// Event name (e.g., track_play, purchase, like).
        name: String,

        /// Owner account the event belongs to.
        #[arg(long)]
        owner: String,

        /// Event value (currency amount or gem count).
        #[arg(long)]
        value: Option<f64>,

        /// Free-form category label.
        #[arg(long)]
        category: Option<String>,

        /// Metadata entries as key=value (e.g., listener_id=abc).
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Show cumulative metrics and the per-day series for a window.
    Report {
        /// Owner account to report on.
        #[arg(long)]
        owner: String,

        /// Trailing window: 7d, 30d, or 90d.
        #[arg(long, default_value = "30d")]
        window: String,

        /// Output JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Dump stored events as JSONL.
    Events {
        /// Owner account to list events for.
        #[arg(long)]
        owner: String,

        /// Only events created at or after this RFC 3339 timestamp.
        #[arg(long)]
        since: Option<String>,
    },
}
