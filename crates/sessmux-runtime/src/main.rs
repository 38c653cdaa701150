//! sessmux: coding-agent session index and terminal resume binder.
//! Single-process binary embedding the indexer and coordinator in-process.

use clap::Parser;

mod cli;
mod cmd_json;
mod cmd_ls;
mod daemon;
mod overrides_file;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("SESSMUX_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    match args.command {
        cli::Command::Daemon(opts) => {
            tracing::info!("sessmux daemon starting");
            daemon::run_daemon(opts).await?;
        }
        cli::Command::Ls(opts) => cmd_ls::cmd_ls(&opts).await?,
        cli::Command::Json(opts) => cmd_json::cmd_json(&opts).await?,
    }

    Ok(())
}
