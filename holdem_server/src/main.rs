//! Multi-table Texas Hold'em server.
//!
//! Tables run as independent actor tasks; this binary wires them to an
//! HTTP lobby and a WebSocket event stream.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use holdem::table::TableManager;
use holdem_server::{api, config::ServerConfig, logging};
use pico_args::Arguments;

const HELP: &str = "\
Run a multi-table Texas Hold'em server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT   Server bind address   [default: env SERVER_BIND or 127.0.0.1:8000]
  --max-tables  N         Cap on open tables    [default: env MAX_TABLES or 50]

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  SERVER_BIND             Server bind address (e.g. 0.0.0.0:8000)
  MAX_TABLES              Cap on open tables
  RUST_LOG                Log filter (e.g. info,holdem=debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // .env never overrides variables already set.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let max_tables_override: Option<usize> = pargs.opt_value_from_str("--max-tables")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, max_tables_override)
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    // Build the evaluator tables before the first hand runs.
    holdem::eval::init();
    tracing::info!("hand evaluator tables ready");

    let tables = Arc::new(TableManager::new(config.max_tables));
    let app = api::create_router(api::AppState { tables });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("server running at http://{} (ctrl-c to stop)", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
}
