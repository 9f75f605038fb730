// Doc Insight - Web Server
// Upload endpoint for the document dashboard

use anyhow::{Context, Result};
use doc_insight::api::{router, AppState};
use doc_insight::config::init_tracing;
use doc_insight::{AppConfig, DocumentAnalyzer, VERSION};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("Doc Insight server v{}", VERSION);

    // Optional config path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    // Training or config failures stop the server before it binds
    let analyzer = DocumentAnalyzer::from_config(&config)?;
    let state = AppState::new(analyzer, &config.server);
    let app = router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server running on http://{}", addr);
    info!("  Upload: POST http://{}/upload", addr);
    info!("  Health: GET  http://{}/health", addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
