//! HTTP server for built quire sites.
//!
//! Serves the output of `quire build`: document, tag and static routes
//! through `routes.json`, every other path straight from the output
//! directory.
//!
//! ```ignore
//! use quire_server::{ServeConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServeConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 7979,
//!         output_dir: "build".into(),
//!     };
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod security;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServeConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Built site directory.
    pub output_dir: PathBuf,
}

impl ServeConfig {
    /// Server settings from the project configuration.
    #[must_use]
    pub fn from_config(config: &quire_config::Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            output_dir: config.docs_resolved.output_dir.clone(),
        }
    }
}

/// Run the server until Ctrl-C.
pub async fn run_server(config: ServeConfig) -> Result<(), ServerError> {
    let state = AppState::load(&config.output_dir)?;
    tracing::info!(
        path = %config.output_dir.display(),
        route_count = state.routes.len(),
        "Loaded built site"
    );
    let app = app::create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
