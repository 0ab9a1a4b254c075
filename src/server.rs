//! HTTP server hosting the metadata API and the preview page.
//!
//! Resolves the preview HTML once at startup, hunts for a free port
//! starting at the configured one, and serves until ctrl-c.

use crate::fetch::Fetcher;
use crate::pipeline::Pipeline;
use crate::rest;
use crate::url_norm::normalize_url_scheme;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Default port for the preview server.
pub const DEFAULT_PORT: u16 = 3141;

/// How many consecutive ports to try when the preferred one is taken.
const PORT_ATTEMPTS: u16 = 100;

/// Where the preview page served at `/` comes from.
#[derive(Debug, Clone, Default)]
pub enum HtmlSource {
    /// The page compiled into the binary.
    #[default]
    Embedded,
    /// A page read from disk at startup.
    LocalFile(PathBuf),
    /// A page fetched over HTTP at startup.
    RemoteFetch(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub html: HtmlSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            html: HtmlSource::Embedded,
        }
    }
}

/// Shared state passed to the REST handlers.
pub struct AppState {
    pub pipeline: Pipeline,
    /// Preview page HTML, resolved once at startup.
    pub page: String,
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> Result<()> {
    serve_with(config, |_| {}).await
}

/// Like [`serve`], but `on_ready` sees the bound address before the
/// server starts accepting requests.
pub async fn serve_with<F>(config: ServerConfig, on_ready: F) -> Result<()>
where
    F: FnOnce(SocketAddr),
{
    let page = resolve_page(&config.html).await?;
    let state = Arc::new(AppState {
        pipeline: Pipeline::new(),
        page,
    });
    let app = rest::router(state);

    let (listener, addr) = bind_available(config.port).await?;
    info!("metadata server listening on http://{addr}");
    on_ready(addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

/// Load the preview page according to the configured source.
async fn resolve_page(source: &HtmlSource) -> Result<String> {
    match source {
        HtmlSource::Embedded => Ok(include_str!("preview.html").to_string()),
        HtmlSource::LocalFile(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read preview page from {}", path.display())),
        HtmlSource::RemoteFetch(url) => {
            let normalized = normalize_url_scheme(url)?;
            info!(url = %normalized, "fetching preview page");
            Ok(Fetcher::new().fetch_html(&normalized).await?)
        }
    }
}

/// Bind the first free port at or after `start_port`.
async fn bind_available(start_port: u16) -> Result<(TcpListener, SocketAddr)> {
    for offset in 0..PORT_ATTEMPTS {
        let Some(port) = start_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if offset > 0 {
                    info!(requested = start_port, bound = port, "preferred port was busy");
                }
                let addr = listener
                    .local_addr()
                    .context("failed to read local address")?;
                return Ok((listener, addr));
            }
            Err(err) => {
                debug!(port, error = %err, "port unavailable");
            }
        }
    }
    anyhow::bail!(
        "no free port found in {}..{}",
        start_port,
        start_port.saturating_add(PORT_ATTEMPTS)
    )
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            // Without a signal handler the server just runs until killed.
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
