//! Error types for the HTTP server.

use std::io;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The output directory has no `routes.json`.
    #[error("no built site in {}; run `quire build` first", .0.display())]
    NotBuilt(PathBuf),

    /// `routes.json` could not be parsed.
    #[error("invalid route table {}: {source}", path.display())]
    InvalidRoutes {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Nothing is served at the requested path.
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
