mod app;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use budview::{DevClient, DirAssets, ViewServer};
use budview_engine::DenoEngine;

use crate::app::create_app;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Proxy assets and evaluation to a running companion build process.
    Live,
    /// Serve a packaged asset bundle with an embedded engine.
    Static,
}

/// budview-server - serve server-rendered views and their client assets
#[derive(Parser, Debug)]
#[command(name = "budview-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Operating mode
    #[arg(long, value_enum, default_value = "static", env = "BUDVIEW_MODE")]
    mode: Mode,

    /// Base URL of the companion build process (live mode)
    #[arg(long, env = "BUDVIEW_UPSTREAM")]
    upstream: Option<Url>,

    /// Root directory of the packaged assets (static mode)
    #[arg(long, default_value = ".", env = "BUDVIEW_DIST")]
    dist: String,

    /// Route to render at /
    #[arg(long, default_value = "/")]
    route: String,

    /// Props passed to the rendered route, as JSON
    #[arg(long, default_value = "{}")]
    props: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budview=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let props: serde_json::Value =
        serde_json::from_str(&cli.props).context("--props must be valid JSON")?;

    let server = Arc::new(match cli.mode {
        Mode::Live => {
            let upstream = cli
                .upstream
                .context("--upstream is required in live mode")?;
            tracing::info!(upstream = %upstream, "starting live view server");
            ViewServer::proxy(Arc::new(DevClient::new(upstream)))
        }
        Mode::Static => {
            tracing::info!(dist = %cli.dist, "starting static view server");
            ViewServer::packaged(
                Arc::new(DirAssets::new(&cli.dist)),
                Arc::new(DenoEngine::spawn()),
            )
        }
    });

    let app = create_app(&server, &cli.route, props);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
