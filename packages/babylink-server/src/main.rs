//! Babylink chat server binary.

use std::process::ExitCode;

use babylink_server::{AppState, Args, ServerConfig};
use clap::Parser;

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    babylink_server::init_tracing(args.log_json);

    match run(ServerConfig::from(args)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Babylink server exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    match &config.database_path {
        Some(path) => tracing::info!(path = path.as_str(), "Using database file"),
        None => tracing::warn!("No database configured, messages are kept in memory only"),
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Babylink server starting on {}", addr);

    babylink_server::serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Babylink server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
