//! CLI definition using clap derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sessmux",
    about = "coding-agent session index and terminal resume binder"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the indexer daemon: watch provider roots, emit JSON events
    Daemon(DaemonOpts),
    /// One-shot scan, project tree on stdout
    Ls(LsOpts),
    /// One-shot scan, machine-readable JSON
    Json(JsonOpts),
}

#[derive(clap::Args)]
pub struct DaemonOpts {
    /// Per-file debounce in milliseconds (overrides CLAUDE_INDEXER_DEBOUNCE_MS)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Overrides file (default: ~/.sessmux/overrides.json, or $SESSMUX_OVERRIDES)
    #[arg(long)]
    pub overrides: Option<PathBuf>,
}

#[derive(clap::Args, Default)]
pub struct LsOpts {
    /// Include archived sessions
    #[arg(long)]
    pub archived: bool,
}

#[derive(clap::Args)]
pub struct JsonOpts {
    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}
