//! `sessmux json` — one-shot scan, machine-readable JSON output.

use sessmux_indexer::{Indexer, IndexerConfig};
use sessmux_providers::all_providers;

use crate::cli::JsonOpts;

pub async fn cmd_json(opts: &JsonOpts) -> anyhow::Result<()> {
    let indexer = Indexer::new(all_providers(), IndexerConfig::from_env());
    indexer.refresh().await;

    let projects = indexer.get_projects();
    let rendered = if opts.pretty {
        serde_json::to_string_pretty(&*projects)?
    } else {
        serde_json::to_string(&*projects)?
    };
    println!("{rendered}");
    Ok(())
}
