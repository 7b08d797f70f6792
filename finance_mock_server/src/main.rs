//! Finance API stub server.
//!
//! This binary loads a declarative API spec and a set of canned fixtures, then answers
//! HTTP requests the way the simulated financial-data API would. It wires together:
//!
//! - `loader`: reads `spec.json` and `resources.json` (paths from the CLI).
//! - `StubServer`: compiles the declared path templates into a route table and resolves
//!   matched requests against the fixtures.
//! - `MarketSession`: the shared market session consulted by quote lookups.
//! - Two axum listeners: the stub API (TCP port or Unix socket) and the config
//!   endpoint that switches the market session.
//!
//! Usage example (CLI):
//! ```bash
//! finance_mock_server --port 12111 --config-port 12112 --verbose
//! curl 'http://localhost:12111/v7/finance/quote?symbols=AAPL,MSFT'
//! curl -d state=regular http://localhost:12112/
//! ```
#![warn(missing_docs)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use finance_mock_common::{MarketSession, MockError, Result, StubServer};
use finance_mock_server::api::{app_router, config_router, market_states};
use finance_mock_server::args::Args;
use finance_mock_server::loader;
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), MockError> {
    let args = Args::parse();
    init_logger(args.verbose);

    run(args).await.inspect_err(|e| error!("Fatal: {}", e))
}

async fn run(args: Args) -> Result<(), MockError> {
    let spec = loader::load_spec(&args.spec)?;
    let fixtures = loader::load_fixtures(&args.fixtures)?;

    let market = Arc::new(MarketSession::default());
    let stub = Arc::new(StubServer::new(&spec, &fixtures, Arc::clone(&market))?);
    info!("Market state is {} (accepted: {})", market.current(), market_states());

    if args.config_port != 0 {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.config_port));
        let listener = TcpListener::bind(addr).await?;
        info!("Config endpoint listening on port {}", args.config_port);
        let router = config_router(Arc::clone(&market));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                error!("Config server failed: {}", e);
            }
        });
    }

    let router = app_router(stub);
    match &args.unix {
        Some(path) => serve_unix(path, router).await?,
        None => {
            let port = args.listen_port();
            let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await?;
            info!("Listening on port {}", port);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

#[cfg(unix)]
async fn serve_unix(path: &std::path::Path, router: axum::Router) -> Result<(), MockError> {
    let listener = tokio::net::UnixListener::bind(path)?;
    info!("Listening on unix socket {}", path.display());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(not(unix))]
async fn serve_unix(path: &std::path::Path, _router: axum::Router) -> Result<(), MockError> {
    Err(MockError::Format(format!(
        "unix sockets are not supported on this platform: {}",
        path.display()
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received. Shutting down...");
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
