//! Daemon wiring: indexer → coordinator → emitted events.
//!
//! The indexer and the binding side are glued here: exposed-state changes
//! become `projects.updated` JSON lines on stdout, destroyed sessions
//! revoke their bindings, and each new session gets one association
//! attempt whose success emits `terminal.session.associated`.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::{debug, info};

use sessmux_coord::{AssociationCoordinator, InMemoryTerminalRegistry};
use sessmux_core::binding::BindingAuthority;
use sessmux_indexer::{Indexer, IndexerConfig};
use sessmux_providers::all_providers;

use crate::cli::DaemonOpts;
use crate::overrides_file::FileOverrides;

pub async fn run_daemon(opts: DaemonOpts) -> anyhow::Result<()> {
    let mut config = IndexerConfig::from_env();
    if let Some(debounce_ms) = opts.debounce_ms {
        config.debounce_ms = debounce_ms;
    }

    let overrides_path = opts.overrides.unwrap_or_else(FileOverrides::default_path);
    let indexer = Indexer::with_overrides(
        all_providers(),
        config,
        Box::new(FileOverrides::new(overrides_path)),
    );

    let authority = Arc::new(Mutex::new(BindingAuthority::new()));
    let registry = Arc::new(InMemoryTerminalRegistry::new(Arc::clone(&authority)));
    let coordinator = Arc::new(AssociationCoordinator::new(registry));

    // Full projects list on every changed scan, then one association
    // sweep. Watermarks inside the coordinator make the sweep a no-op for
    // every session that has not advanced since the last attempt.
    let coord = Arc::clone(&coordinator);
    indexer.on_update(move |projects| {
        emit("projects.updated", json!({ "projects": projects }));
        for project in projects {
            for session in &project.sessions {
                let outcome = coord.associate_single_session(session);
                if outcome.associated
                    && let Some(terminal_id) = &outcome.terminal_id
                {
                    info!(key = %session.key, terminal = %terminal_id, "session associated");
                    emit(
                        "terminal.session.associated",
                        json!({
                            "terminalId": terminal_id,
                            "sessionId": session.key.to_string(),
                        }),
                    );
                }
            }
        }
    });

    // Destroyed sessions release their bindings even though the terminal
    // id is no longer known here.
    let revoke_authority = Arc::clone(&authority);
    indexer.on_session_removed(move |keys| {
        let mut authority = revoke_authority.lock().expect("authority lock poisoned");
        for key in keys {
            if let Some(terminal) = authority.clear_session_owner(key.provider, &key.id) {
                info!(key = %key, terminal = %terminal, "binding revoked for removed session");
            }
        }
        emit(
            "sessions.removed",
            json!({ "keys": keys.iter().map(ToString::to_string).collect::<Vec<_>>() }),
        );
    });

    // New sessions announce themselves after the update (and therefore
    // after the association sweep for the scan that exposed them).
    indexer.on_new_session(move |session| {
        debug!(key = %session.key, "new session");
        emit("session.new", json!({ "session": session }));
    });

    indexer.start().await;
    info!("sessmux daemon started");

    wait_for_shutdown().await;

    indexer.stop();
    info!("sessmux daemon stopped");
    Ok(())
}

/// Newline-delimited JSON events on stdout — the transport boundary.
fn emit(event: &str, data: serde_json::Value) {
    println!("{}", json!({ "event": event, "data": data }));
}

async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("received ctrl-c, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received ctrl-c, shutting down");
    }
}
