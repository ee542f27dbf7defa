//! jobkeeper - Daemon Entry Point
//!
//! Composition root: wires storage, the ready-queue hint and the JSON-RPC
//! server, runs migrations, and drives the background reconcile /
//! requeue-ready tick loop. There is no in-process job executor here —
//! running job payloads is a client concern (see `jobkeeper-sdk`'s
//! `Worker`); this process only keeps the schedule honest.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobkeeper_api_rpc::{RpcServer, RpcServerConfig};
use jobkeeper_core::application::constants::DEFAULT_RECONCILE_LIMIT;
use jobkeeper_core::application::lifecycle::{reconcile, requeue_ready};
use jobkeeper_core::application::RetryPolicy;
use jobkeeper_core::port::id_provider::UuidIdProvider;
use jobkeeper_core::port::time_provider::SystemTimeProvider;
use jobkeeper_infra_hint::InProcessReadyQueueHint;
use jobkeeper_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "jobkeeper.db";

fn init_logging() {
    let log_format = std::env::var("JOBKEEPER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("jobkeeper=info"))
        .expect("failed to build env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!("jobkeeper v{VERSION} starting...");

    let db_path = std::env::var("JOBKEEPER_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let db_url = format!("sqlite://{db_path}");

    info!(db_path = %db_path, "initializing database...");
    let pool = create_pool(&db_url)
        .await
        .map_err(|e| anyhow::anyhow!("db pool creation failed: {e}"))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("migration failed: {e}"))?;

    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidIdProvider);
    let store: Arc<dyn jobkeeper_core::port::JobStore> =
        Arc::new(SqliteJobStore::new(pool.clone()));
    let hint: Arc<dyn jobkeeper_core::port::ReadyQueueHint> =
        Arc::new(InProcessReadyQueueHint::new());
    let retry_policy = RetryPolicy::new();

    info!("running startup reconciliation sweep...");
    match reconcile(store.as_ref(), hint.as_ref(), time_provider.as_ref(), DEFAULT_RECONCILE_LIMIT).await {
        Ok(outcome) => info!(?outcome, "startup reconciliation complete"),
        Err(e) => error!(error = ?e, "startup reconciliation failed"),
    }

    info!("starting JSON-RPC server...");
    let rpc_config = RpcServerConfig::default();
    let rpc_server = RpcServer::new(
        rpc_config,
        store.clone(),
        hint.clone(),
        id_provider.clone(),
        time_provider.clone(),
        retry_policy,
    );
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {e}"))?;

    info!("starting reconcile/requeue-ready tick loop...");
    let reconcile_interval_secs: u64 = std::env::var("JOBKEEPER_RECONCILE_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);

    let tick_store = store.clone();
    let tick_hint = hint.clone();
    let tick_time = time_provider.clone();
    let tick_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(reconcile_interval_secs));
        loop {
            interval.tick().await;

            match requeue_ready(
                tick_store.as_ref(),
                tick_hint.as_ref(),
                tick_time.as_ref(),
                DEFAULT_RECONCILE_LIMIT,
            )
            .await
            {
                Ok(pushed) if pushed > 0 => info!(pushed, "requeue-ready tick"),
                Ok(_) => {}
                Err(e) => warn!(error = ?e, "requeue-ready tick failed"),
            }

            match reconcile(
                tick_store.as_ref(),
                tick_hint.as_ref(),
                tick_time.as_ref(),
                DEFAULT_RECONCILE_LIMIT,
            )
            .await
            {
                Ok(outcome)
                    if outcome.recovered > 0 || outcome.dead > 0 || outcome.requeued > 0 =>
                {
                    info!(?outcome, "reconcile tick")
                }
                Ok(_) => {}
                Err(e) => warn!(error = ?e, "reconcile tick failed"),
            }
        }
    });

    info!("jobkeeper ready. Press Ctrl+C to shut down.");
    tokio::signal::ctrl_c().await?;

    info!("shutdown signal received, exiting gracefully...");
    tick_handle.abort();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {e}"))?;

    info!("shutdown complete.");
    Ok(())
}
