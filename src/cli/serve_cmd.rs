//! `metalens serve` — run the metadata API and preview server.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::output::{self, Styled};
use crate::server::{self, HtmlSource, ServerConfig};

pub async fn run(port: u16, html_file: Option<PathBuf>, html_url: Option<String>) -> Result<()> {
    let s = Styled::new();

    // Initialize tracing
    let directive = if output::is_verbose() {
        "metalens=debug"
    } else {
        "metalens=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();

    info!("starting Metalens v{}", env!("CARGO_PKG_VERSION"));

    // Clap rejects --html-file together with --html-url, so file wins here.
    let html = match (html_file, html_url) {
        (Some(path), _) => HtmlSource::LocalFile(path),
        (None, Some(url)) => HtmlSource::RemoteFetch(url),
        (None, None) => HtmlSource::Embedded,
    };

    server::serve_with(ServerConfig { port, html }, move |addr| {
        if !output::is_quiet() && !output::is_json() {
            eprintln!(
                "  {} Metalens v{} serving at http://localhost:{}",
                s.ok_sym(),
                env!("CARGO_PKG_VERSION"),
                addr.port()
            );
            eprintln!("  Press Ctrl+C to stop the server");
        }
    })
    .await
}
