//! Command-line arguments for the quote client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quote_common::net::{NOTICE_SECS, REQUEST_TIMEOUT_SECS, SERVER_URL, SYNC_INTERVAL_SECS};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the persisted quote collection.
    #[clap(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Remote quote source used for fetching and mirroring.
    #[clap(long, default_value = SERVER_URL)]
    pub server_url: String,

    /// Seconds between two scheduled syncs (at least 1).
    #[clap(long, default_value_t = SYNC_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Seconds after which a remote request is abandoned (at least 1).
    #[clap(long, default_value_t = REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Seconds a "new quotes" notice stays visible.
    #[clap(long, default_value_t = NOTICE_SECS)]
    pub notice_secs: u64,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Client operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync now, then keep syncing periodically until Ctrl+C.
    Run,
    /// Run a single sync cycle.
    Sync,
    /// Add a quote locally and mirror it to the server.
    Add {
        /// Quote text.
        #[clap(long)]
        text: String,
        /// Quote category.
        #[clap(long)]
        category: String,
    },
    /// Print a random quote.
    Random {
        /// Only pick from this category ("all" for every category).
        #[clap(long)]
        category: Option<String>,
    },
    /// List the known categories.
    Categories,
    /// Print every stored quote.
    List,
    /// Write the collection to a JSON file.
    Export {
        /// Target file.
        #[clap(long)]
        path: String,
    },
    /// Merge quotes from a JSON file into the collection.
    Import {
        /// Source file.
        #[clap(long)]
        path: String,
    },
}
