//! snoozd — quiescence-triggered power management daemon.
//!
//! Watches a fixed set of workload objects and suspends the host once
//! all of them have held zero desired replicas for a grace period.
//! Assembles:
//! - Reconcile engine (tracker + debounce timer + suspend action)
//! - File-backed replica lookup
//! - Health probe endpoints (`/healthz`, `/readyz`)
//!
//! # Usage
//!
//! ```text
//! WATCHED_DEPLOYMENTS=default/api,prod/worker TIMER_DURATION=1h30m snoozd
//! ```

mod spec_file;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::info;

use snooze_core::{WatchSet, grace_period};
use snooze_engine::{ReconcileEngine, SuspendAction};

use crate::spec_file::SpecFileLookup;

#[derive(Parser)]
#[command(name = "snoozd", about = "Quiescence-triggered power management daemon")]
struct Cli {
    /// Comma-separated namespace/name pairs to watch.
    #[arg(long, env = "WATCHED_DEPLOYMENTS")]
    watch: String,

    /// Grace period before the suspend action fires (e.g. "1h30m").
    /// Malformed values fall back to 1h.
    #[arg(long, env = "TIMER_DURATION")]
    grace_period: Option<String>,

    /// TOML file publishing desired replica counts.
    #[arg(long, env = "REPLICA_SPEC_FILE", default_value = "/var/lib/snoozd/replicas.toml")]
    replica_file: PathBuf,

    /// Health probe bind address.
    #[arg(long, env = "PROBE_ADDR", default_value = "0.0.0.0:8081")]
    probe_addr: SocketAddr,

    /// Full resync interval in seconds.
    #[arg(long, default_value = "30")]
    resync_interval: u64,

    /// Power-state control file written on suspend.
    #[arg(long, default_value = "/sys/power/state")]
    power_state_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,snoozd=debug,snooze=debug".parse().unwrap()),
        )
        .init();

    if !load_env() {
        info!("no .env file loaded, using environment variables");
    }

    let cli = Cli::parse();

    let watch_set = WatchSet::parse(&cli.watch)?;
    let grace = grace_period(cli.grace_period.as_deref());
    info!(
        watches = watch_set.len(),
        grace_secs = grace.as_secs(),
        replica_file = ?cli.replica_file,
        "snoozd starting"
    );

    let lookup = Arc::new(SpecFileLookup::new(&cli.replica_file));
    let action = Arc::new(SuspendAction::with_state_path(&cli.power_state_path));
    let engine = Arc::new(ReconcileEngine::new(watch_set, lookup, action, grace));

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Reconcile loop ─────────────────────────────────────────

    // The notification side of the channel stays open for the process
    // lifetime; a watch collaborator can be wired to `notify_tx` later.
    // Until then the resync tick drives reconciliation.
    let (_notify_tx, notify_rx) = mpsc::channel(64);
    let resync_interval = Duration::from_secs(cli.resync_interval);

    let engine_shutdown = shutdown_rx.clone();
    let loop_engine = Arc::clone(&engine);
    let engine_handle = tokio::spawn(async move {
        loop_engine
            .run(notify_rx, resync_interval, engine_shutdown)
            .await;
    });

    // ── Health probes ──────────────────────────────────────────

    let listener = tokio::net::TcpListener::bind(cli.probe_addr).await?;
    info!(addr = %cli.probe_addr, "probe server starting");

    let server = axum::serve(listener, probe_router()).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;
    let _ = engine_handle.await;

    info!("snoozd stopped");
    Ok(())
}

/// Readiness and liveness endpoints, always healthy while running.
fn probe_router() -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
}

/// Load a .env file: explicit `ENV_FILE` path first, then alongside
/// the executable, then the current directory.
fn load_env() -> bool {
    if let Ok(path) = std::env::var("ENV_FILE") {
        return dotenvy::from_path(&path).is_ok();
    }
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
        && dotenvy::from_path(dir.join(".env")).is_ok()
    {
        return true;
    }
    dotenvy::dotenv().is_ok()
}
