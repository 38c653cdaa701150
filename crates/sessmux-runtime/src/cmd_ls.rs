//! `sessmux ls` — one-shot scan, project tree on stdout.

use chrono::{DateTime, Utc};

use sessmux_indexer::{Indexer, IndexerConfig};
use sessmux_providers::all_providers;

use crate::cli::LsOpts;

pub async fn cmd_ls(opts: &LsOpts) -> anyhow::Result<()> {
    let indexer = Indexer::new(all_providers(), IndexerConfig::from_env());
    indexer.refresh().await;

    let projects = indexer.get_projects();
    if projects.is_empty() {
        println!("no sessions found");
        return Ok(());
    }

    for project in projects.iter() {
        let visible: Vec<_> = project
            .sessions
            .iter()
            .filter(|s| opts.archived || !s.archived)
            .collect();
        if visible.is_empty() {
            continue;
        }

        println!("{}  ({} sessions)", project.path, visible.len());
        for session in visible {
            let when = format_ms(session.updated_at_ms);
            let title = session.title.as_deref().unwrap_or("(untitled)");
            let marker = if session.archived { " [archived]" } else { "" };
            println!(
                "  {:<9} {}  {}  {}{}",
                session.key.provider.to_string(),
                short_id(&session.key.id),
                when,
                title,
                marker,
            );
        }
    }
    Ok(())
}

fn short_id(id: &str) -> String {
    let mut short: String = id.chars().take(8).collect();
    if short.len() < id.len() {
        short.push('…');
    }
    short
}

fn format_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_long_ids() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("550e8400-e29b"), "550e8400…");
    }

    #[test]
    fn format_ms_renders_utc() {
        assert_eq!(format_ms(0), "1970-01-01 00:00");
    }
}
